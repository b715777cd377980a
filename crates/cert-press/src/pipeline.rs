//! Export pipeline.
//!
//! Settles each rendered document, captures it on the blocking pool and
//! appends it to the PDF. Documents are processed strictly in input order,
//! one at a time, so page order matches the list and peak memory stays at
//! a single page raster.

use std::path::{Path, PathBuf};

use cert_layout::{RenderedDocument, SettledDocument};
use image::RgbaImage;

use crate::PressError;
use crate::font::PageFont;
use crate::pdf::PdfBuilder;
use crate::raster;
use crate::stage::ExportStage;

/// Capture one settled document on the blocking pool.
pub async fn capture(settled: SettledDocument, font: &PageFont) -> Result<RgbaImage, PressError> {
    let font = font.clone();
    tokio::task::spawn_blocking(move || {
        let font_ref = font.font()?;
        raster::rasterize(&settled, &font_ref)
    })
    .await
    .map_err(|e| PressError::CaptureTask(e.to_string()))?
}

/// Produce the finished PDF as bytes, one page per document.
pub async fn export_to_bytes(
    documents: Vec<RenderedDocument>,
    font: &PageFont,
) -> Result<Vec<u8>, PressError> {
    let mut builder = PdfBuilder::new();
    for document in documents {
        let settled = document.settle().await;
        let raster = capture(settled, font).await?;
        builder.add_page(&raster)?;
    }
    builder.to_bytes()
}

/// Export to `destination`.
///
/// The file is written into a scratch stage and renamed into place, so the
/// destination only ever holds a complete document.
pub async fn export_to_file(
    documents: Vec<RenderedDocument>,
    font: &PageFont,
    destination: &Path,
) -> Result<PathBuf, PressError> {
    let page_count = documents.len();
    let bytes = export_to_bytes(documents, font).await?;
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    tokio::fs::create_dir_all(parent).await?;
    let stage = ExportStage::create(parent)?;
    let staged = stage.file("document.pdf");
    tokio::fs::write(&staged, &bytes).await?;
    tokio::fs::rename(&staged, destination).await?;
    tracing::info!(path = %destination.display(), pages = page_count, "export complete");
    Ok(destination.to_path_buf())
}
