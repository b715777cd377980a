//! Certificate studio application shell.
//!
//! Wires the registry database, the layout and export pipeline and the
//! OTP-guarded deletion flow behind one shared state, consumed by the
//! headless CLI binary.

pub mod app;
pub mod config;
pub mod services;

use std::path::PathBuf;

use registry_db::Database;

use config::AppConfig;

/// Determine the data directory for the application.
/// Priority: CERT_STUDIO_DATA_DIR env var > ~/.cert-studio
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CERT_STUDIO_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cert-studio")
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Open the registry, load config, log anything suspicious.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("registry.db");

    tracing::info!("Opening registry at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let config = AppConfig::load();
    config.log_warnings();

    tracing::info!(
        "Configuration loaded (origin={}, id_prefix={})",
        config.origin,
        config.id_prefix
    );
    Ok((db, config, dir))
}
