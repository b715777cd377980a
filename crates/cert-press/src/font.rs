//! Page font loading.
//!
//! Resolution order: an explicitly configured file, then the
//! `CERT_STUDIO_FONT` environment variable, then well-known system font
//! locations. Font bytes are validated once at load; capture re-parses
//! them per use because [`ab_glyph::FontRef`] borrows the data.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::FontRef;

use crate::PressError;

const FONT_ENV_VAR: &str = "CERT_STUDIO_FONT";

#[derive(Clone)]
pub struct PageFont {
    data: Arc<Vec<u8>>,
}

impl PageFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PressError> {
        FontRef::try_from_slice(&data)
            .map_err(|_| PressError::Font("failed to parse font data (TTF/OTF)".to_string()))?;
        Ok(Self { data: Arc::new(data) })
    }

    pub fn from_file(path: &Path) -> Result<Self, PressError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Load the first usable font, preferring `explicit` when given.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, PressError> {
        if let Some(path) = explicit {
            let font = Self::from_file(path)?;
            tracing::info!(path = %path.display(), "Using configured page font");
            return Ok(font);
        }
        if let Ok(path) = std::env::var(FONT_ENV_VAR) {
            let font = Self::from_file(Path::new(&path))?;
            tracing::info!(path = %path, "Using page font from CERT_STUDIO_FONT");
            return Ok(font);
        }
        for path in system_font_candidates() {
            if let Ok(data) = std::fs::read(path) {
                if let Ok(font) = Self::from_bytes(data) {
                    tracing::info!(path = %path, "Using system font for page capture");
                    return Ok(font);
                }
            }
        }
        Err(PressError::Font(
            "no usable page font found (set CERT_STUDIO_FONT or install system fonts)".to_string(),
        ))
    }

    pub fn font(&self) -> Result<FontRef<'_>, PressError> {
        FontRef::try_from_slice(&self.data)
            .map_err(|_| PressError::Font("failed to parse font data (TTF/OTF)".to_string()))
    }
}

fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Helvetica.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &[
            "C:\\Windows\\Fonts\\arial.ttf",
            "C:\\Windows\\Fonts\\times.ttf",
            "C:\\Windows\\Fonts\\segoeui.ttf",
        ]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
            "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        ]
    }
}
