//! Certificate rendering.
//!
//! [`render_certificate`] composes the page and kicks off QR encoding on the
//! blocking pool. The returned [`RenderedDocument`] is immediately usable
//! for preview; capture backends call [`RenderedDocument::settle`] to wait
//! for the QR raster, so a page is never exported with a half-finished QR
//! region. A failed encode logs a warning and leaves the region blank
//! rather than failing the whole document.

use image::GrayImage;
use tokio::task::JoinHandle;

use crate::compose::certificate_layout;
use crate::data::CertificateData;
use crate::document::LayoutDocument;
use crate::qr::{self, QrError, QrOptions};

pub const DEFAULT_ISSUER: &str = "Modern Institute of Engineering";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Origin the verification URL points at, e.g. `https://certs.example.org`.
    pub origin: String,
    /// Institute name printed at the top of the page.
    pub issuer: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }
}

/// A composed page whose QR raster may still be encoding.
pub struct RenderedDocument {
    layout: LayoutDocument,
    qr_task: Option<JoinHandle<Result<GrayImage, QrError>>>,
}

/// A page with every region resolved, ready for capture.
pub struct SettledDocument {
    pub layout: LayoutDocument,
    pub qr_raster: Option<GrayImage>,
}

/// Compose `data` and start encoding its QR region.
///
/// Must be called inside a tokio runtime.
pub fn render_certificate(data: &CertificateData, options: &RenderOptions) -> RenderedDocument {
    let layout = certificate_layout(data, &options.origin, &options.issuer);
    let qr_task = layout.qr().map(|region| {
        let payload = region.payload.clone();
        let opts = QrOptions {
            width_px: region.width_px,
            margin_modules: region.margin_modules,
        };
        tokio::task::spawn_blocking(move || qr::encode_qr(&payload, opts))
    });
    RenderedDocument { layout, qr_task }
}

impl RenderedDocument {
    /// Wrap an already-composed layout. No QR task is started; the QR
    /// region, if any, settles blank.
    pub fn from_layout(layout: LayoutDocument) -> Self {
        Self { layout, qr_task: None }
    }

    pub fn layout(&self) -> &LayoutDocument {
        &self.layout
    }

    /// Adjust the preview scale. Capture output is unaffected.
    pub fn with_display_scale(mut self, scale: f32) -> Self {
        self.layout.display_scale = scale;
        self
    }

    /// Wait for every in-flight region to finish.
    pub async fn settle(mut self) -> SettledDocument {
        let qr_raster = match self.qr_task.take() {
            None => None,
            Some(task) => match task.await {
                Ok(Ok(img)) => Some(img),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "QR encoding failed, leaving region blank");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "QR encoding task aborted, leaving region blank");
                    None
                }
            },
        };
        SettledDocument {
            layout: self.layout,
            qr_raster,
        }
    }
}
