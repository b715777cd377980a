//! Scratch staging for in-flight exports.
//!
//! Finished files are written into a hidden staging directory and renamed
//! into place, so an interrupted or failed export never leaves a partial
//! file at the destination. The stage removes itself on drop.

use std::path::{Path, PathBuf};

use crate::PressError;

pub struct ExportStage {
    dir: PathBuf,
}

impl ExportStage {
    /// Create a fresh stage under `base`.
    pub fn create(base: &Path) -> Result<Self, PressError> {
        let dir = base
            .join(".staging")
            .join(format!("export-{}", nanoid::nanoid!(8)));
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for ExportStage {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to remove export stage");
            }
        }
    }
}
