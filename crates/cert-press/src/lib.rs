//! Certificate capture and export.
//!
//! Turns settled layout documents into fixed-size page rasters and
//! paginated PDF files. Capture always runs on the same pixel grid (794 x
//! 1123 for A4 at 96 dpi), so every export of the same document is
//! identical regardless of how the document was previewed.

pub mod font;
pub mod naming;
pub mod pdf;
pub mod pipeline;
pub mod raster;
pub mod stage;

pub use font::PageFont;
pub use pdf::PdfBuilder;
pub use stage::ExportStage;

/// Capture raster width for an A4 page, in pixels.
pub const PAGE_WIDTH_PX: u32 = 794;
/// Capture raster height for an A4 page, in pixels.
pub const PAGE_HEIGHT_PX: u32 = 1123;

/// A4 page size in PDF points.
pub const A4_WIDTH_PT: f32 = 595.276;
pub const A4_HEIGHT_PT: f32 = 841.89;

#[derive(Debug, thiserror::Error)]
pub enum PressError {
    #[error("layout document has no content to capture")]
    MissingLayoutRoot,
    #[error("page raster has a zero dimension ({width}x{height})")]
    ZeroDimensionRaster { width: u32, height: u32 },
    #[error("no pages were added to the document")]
    EmptyDocument,
    #[error("font error: {0}")]
    Font(String),
    #[error("image encoding failed: {0}")]
    ImageEncode(#[from] image::ImageError),
    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("capture task failed: {0}")]
    CaptureTask(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
