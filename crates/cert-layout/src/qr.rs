//! Verification QR encoding.
//!
//! The payload is always the public verification URL for a certificate id.
//! Encoding is pure: the same payload and options produce byte-identical
//! rasters on every call.

use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};

/// Default edge length of the embedded QR raster in pixels.
pub const DEFAULT_QR_WIDTH_PX: u32 = 80;
/// Default quiet zone around the module grid, in modules.
pub const DEFAULT_QR_MARGIN_MODULES: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR payload is empty")]
    EmptyPayload,
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    pub width_px: u32,
    pub margin_modules: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            width_px: DEFAULT_QR_WIDTH_PX,
            margin_modules: DEFAULT_QR_MARGIN_MODULES,
        }
    }
}

/// The URL a scanned certificate resolves to.
///
/// Format is fixed: `{origin}/verify?id={certificate_id}`. A trailing slash
/// on the origin is dropped so the path never doubles it.
pub fn verification_url(origin: &str, certificate_id: &str) -> String {
    let origin = origin.trim_end_matches('/');
    format!("{origin}/verify?id={certificate_id}")
}

/// Encode `payload` as a grayscale QR raster of exactly `opts.width_px`
/// pixels per side.
///
/// Modules are drawn at the largest integer scale that fits inside the
/// target together with the quiet zone, then centred on a white square of
/// the requested size. If the target is smaller than the module grid the
/// raster falls back to one pixel per module and exceeds the request.
pub fn encode_qr(payload: &str, opts: QrOptions) -> Result<GrayImage, QrError> {
    if payload.is_empty() {
        return Err(QrError::EmptyPayload);
    }
    let code = QrCode::new(payload.as_bytes())?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let grid = module_count + opts.margin_modules * 2;
    let scale = (opts.width_px / grid).max(1);
    let drawn = grid * scale;

    let mut img = GrayImage::from_pixel(drawn, drawn, Luma([255u8]));
    for (i, color) in modules.iter().enumerate() {
        if *color == Color::Dark {
            let mx = (i as u32 % module_count + opts.margin_modules) * scale;
            let my = (i as u32 / module_count + opts.margin_modules) * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(mx + dx, my + dy, Luma([0u8]));
                }
            }
        }
    }

    if drawn >= opts.width_px {
        return Ok(img);
    }
    let mut padded = GrayImage::from_pixel(opts.width_px, opts.width_px, Luma([255u8]));
    let offset = (opts.width_px - drawn) / 2;
    for (x, y, px) in img.enumerate_pixels() {
        padded.put_pixel(x + offset, y + offset, *px);
    }
    Ok(padded)
}

/// Encode `payload` and return the raster as PNG bytes.
pub fn encode_qr_png(payload: &str, opts: QrOptions) -> Result<Vec<u8>, QrError> {
    let img = encode_qr(payload, opts)?;
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(bytes)
}
