use std::path::PathBuf;
use std::sync::Arc;

use cert_press::{PageFont, PressError};
use registry_db::Database;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::services::export::ExportService;
use crate::services::issuance::IssuanceService;
use crate::services::removal::{ConsoleDelivery, DeleteGate};
use crate::services::verification::VerificationService;

/// Application shared state accessible from the CLI and any embedding
/// server.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    /// Registry database handle
    db: Database,
    /// Data directory path
    data_dir: PathBuf,
    /// OTP-guarded deletion flow
    delete_gate: DeleteGate<Database>,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded config.
    pub fn new(db: Database, config: AppConfig, data_dir: PathBuf) -> Self {
        let delete_gate = DeleteGate::new(db.clone(), Arc::new(ConsoleDelivery));

        Self {
            inner: Arc::new(SharedStateInner {
                config: RwLock::new(config),
                db,
                data_dir,
                delete_gate,
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Issuance service bound to the configured id prefix.
    pub async fn issuance(&self) -> IssuanceService<Database> {
        let config = self.config().await;
        IssuanceService::new(self.inner.db.clone(), config.id_prefix.clone())
    }

    /// Verification service bound to the configured origin and issuer.
    pub async fn verification(&self) -> VerificationService<Database> {
        let config = self.config().await;
        VerificationService::new(self.inner.db.clone(), config.render_options())
    }

    /// Export service. Discovers the page font, so this fails on machines
    /// with no usable font.
    pub async fn export(&self) -> Result<ExportService<Database>, PressError> {
        let config = self.config().await;
        let font = PageFont::discover(config.font_path.as_deref())?;
        Ok(ExportService::new(
            self.inner.db.clone(),
            config.render_options(),
            config.output_dir.clone(),
            font,
        ))
    }

    pub fn delete_gate(&self) -> &DeleteGate<Database> {
        &self.inner.delete_gate
    }
}
