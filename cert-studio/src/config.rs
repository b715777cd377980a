//! Runtime application configuration loaded from environment variables.

use std::path::PathBuf;

use cert_layout::{DEFAULT_ISSUER, RenderOptions};

/// Default public origin for verification links.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";
/// Default prefix for newly minted certificate ids.
pub const DEFAULT_ID_PREFIX: &str = "MIE";

/// Runtime configuration populated from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Public origin prepended to `/verify?id=...` in QR payloads.
    pub origin: String,
    /// Institute name printed at the top of every certificate.
    pub issuer: String,
    /// Prefix for newly minted certificate ids.
    pub id_prefix: String,
    /// Directory finished PDF exports land in.
    pub output_dir: PathBuf,
    /// Explicit font file; system fonts are searched when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.into(),
            issuer: DEFAULT_ISSUER.into(),
            id_prefix: DEFAULT_ID_PREFIX.into(),
            output_dir: PathBuf::from("exports"),
            font_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Self {
        let defaults = Self::default();

        let origin = env_or("CERT_STUDIO_ORIGIN", &defaults.origin);
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            issuer: env_or("CERT_STUDIO_ISSUER", &defaults.issuer),
            id_prefix: env_or("CERT_STUDIO_ID_PREFIX", &defaults.id_prefix),
            output_dir: std::env::var("CERT_STUDIO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            font_path: std::env::var("CERT_STUDIO_FONT").ok().map(PathBuf::from),
        }
    }

    /// Options handed to the renderer for QR payloads and the page header.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            origin: self.origin.clone(),
            issuer: self.issuer.clone(),
        }
    }

    /// Log warnings for values that will produce surprising output.
    pub fn log_warnings(&self) {
        if !self.origin.starts_with("http://") && !self.origin.starts_with("https://") {
            tracing::warn!(
                "CERT_STUDIO_ORIGIN {:?} has no scheme, QR payloads will not resolve",
                self.origin
            );
        }
        if self.id_prefix.trim().is_empty() {
            tracing::warn!("CERT_STUDIO_ID_PREFIX is blank, minted ids will start with '-'");
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
