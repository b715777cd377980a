//! Page capture.
//!
//! Maps millimetre geometry onto the fixed capture grid and draws each
//! element. The document's display scale is never consulted here: preview
//! zoom must not leak into captured output.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use cert_layout::{
    Align, Element, FrameElement, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, SettledDocument, TextElement,
};
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::{PAGE_HEIGHT_PX, PAGE_WIDTH_PX, PressError};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Horizontal millimetre position to capture pixels.
pub fn px_x(mm: f32) -> i32 {
    (mm * PAGE_WIDTH_PX as f32 / PAGE_WIDTH_MM).round() as i32
}

/// Vertical millimetre position to capture pixels.
pub fn px_y(mm: f32) -> i32 {
    (mm * PAGE_HEIGHT_PX as f32 / PAGE_HEIGHT_MM).round() as i32
}

fn px_thickness(mm: f32) -> u32 {
    ((mm * PAGE_HEIGHT_PX as f32 / PAGE_HEIGHT_MM).round() as u32).max(1)
}

fn px_scale(size_mm: f32) -> PxScale {
    PxScale::from(size_mm * PAGE_HEIGHT_PX as f32 / PAGE_HEIGHT_MM)
}

/// Advance width of `text` at `scale`, including kerning.
pub fn measure_text_width(font: &FontRef, text: &str, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width.ceil() as u32
}

/// Capture a settled document onto the fixed A4 pixel grid.
pub fn rasterize(doc: &SettledDocument, font: &FontRef<'_>) -> Result<RgbaImage, PressError> {
    if doc.layout.elements.is_empty() {
        return Err(PressError::MissingLayoutRoot);
    }
    let mut img = RgbaImage::from_pixel(PAGE_WIDTH_PX, PAGE_HEIGHT_PX, WHITE);
    for element in &doc.layout.elements {
        match element {
            Element::Text(t) => draw_aligned_text(&mut img, font, t),
            Element::Rule(r) => {
                let x = px_x(r.x_mm);
                let y = px_y(r.y_mm);
                let w = (px_x(r.x_mm + r.width_mm) - x).max(1) as u32;
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at(x, y).of_size(w, px_thickness(r.thickness_mm)),
                    BLACK,
                );
            }
            Element::Frame(f) => draw_frame(&mut img, f),
            Element::Qr(q) => {
                if let Some(raster) = &doc.qr_raster {
                    blit_gray(&mut img, raster, px_x(q.x_mm), px_y(q.y_mm));
                }
            }
        }
    }
    Ok(img)
}

fn draw_aligned_text(img: &mut RgbaImage, font: &FontRef, t: &TextElement) {
    let scale = px_scale(t.size_mm);
    let width = measure_text_width(font, &t.content, scale) as i32;
    let anchor = px_x(t.x_mm);
    let x = match t.align {
        Align::Left => anchor,
        Align::Center => anchor - width / 2,
        Align::Right => anchor - width,
    };
    draw_text_mut(img, BLACK, x, px_y(t.y_mm), scale, font, &t.content);
}

fn draw_frame(img: &mut RgbaImage, f: &FrameElement) {
    let x = px_x(f.x_mm);
    let y = px_y(f.y_mm);
    let w = (px_x(f.x_mm + f.width_mm) - x).max(1) as u32;
    let h = (px_y(f.y_mm + f.height_mm) - y).max(1) as u32;
    let t = px_thickness(f.thickness_mm).min(w).min(h);
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, t), BLACK);
    draw_filled_rect_mut(img, Rect::at(x, y + h as i32 - t as i32).of_size(w, t), BLACK);
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(t, h), BLACK);
    draw_filled_rect_mut(img, Rect::at(x + w as i32 - t as i32, y).of_size(t, h), BLACK);
}

/// Copy a grayscale raster onto the page, clipping at the page edge.
fn blit_gray(img: &mut RgbaImage, src: &GrayImage, x: i32, y: i32) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for (sx, sy, px) in src.enumerate_pixels() {
        let dx = x + sx as i32;
        let dy = y + sy as i32;
        if dx < 0 || dy < 0 || dx >= w || dy >= h {
            continue;
        }
        let v = px.0[0];
        img.put_pixel(dx as u32, dy as u32, Rgba([v, v, v, 255]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cert_layout::{CertificateData, LayoutDocument, RenderOptions, render_certificate};

    use crate::font::PageFont;

    fn test_font() -> Option<PageFont> {
        match PageFont::discover(None) {
            Ok(font) => Some(font),
            Err(_) => {
                eprintln!("skipping: no usable page font on this machine");
                None
            }
        }
    }

    fn sample() -> CertificateData {
        CertificateData {
            certificate_id: "MIE-1700000000-ABC123XYZ".to_string(),
            student_name: "Priya Sharma".to_string(),
            course_name: "Advanced Welding".to_string(),
            issue_date: "20/06/2024".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn millimetre_grid_maps_to_capture_pixels() {
        assert_eq!(px_x(0.0), 0);
        assert_eq!(px_x(PAGE_WIDTH_MM), PAGE_WIDTH_PX as i32);
        assert_eq!(px_y(PAGE_HEIGHT_MM), PAGE_HEIGHT_PX as i32);
        assert_eq!(px_x(PAGE_WIDTH_MM / 2.0), 397);
    }

    #[test]
    fn empty_document_is_rejected() {
        let Some(page_font) = test_font() else { return };
        let font = page_font.font().unwrap();
        let doc = SettledDocument {
            layout: LayoutDocument::a4(),
            qr_raster: None,
        };
        assert!(matches!(
            rasterize(&doc, &font),
            Err(PressError::MissingLayoutRoot)
        ));
    }

    #[tokio::test]
    async fn capture_has_fixed_page_dimensions() {
        let Some(page_font) = test_font() else { return };
        let font = page_font.font().unwrap();
        let settled = render_certificate(&sample(), &RenderOptions::default())
            .settle()
            .await;
        let raster = rasterize(&settled, &font).unwrap();
        assert_eq!(raster.width(), PAGE_WIDTH_PX);
        assert_eq!(raster.height(), PAGE_HEIGHT_PX);
    }

    #[tokio::test]
    async fn preview_scale_never_reaches_the_capture() {
        let Some(page_font) = test_font() else { return };
        let font = page_font.font().unwrap();
        let opts = RenderOptions::default();
        let full = render_certificate(&sample(), &opts).settle().await;
        let scaled = render_certificate(&sample(), &opts)
            .with_display_scale(0.4)
            .settle()
            .await;
        let a = rasterize(&full, &font).unwrap();
        let b = rasterize(&scaled, &font).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[tokio::test]
    async fn capture_is_deterministic() {
        let Some(page_font) = test_font() else { return };
        let font = page_font.font().unwrap();
        let opts = RenderOptions::default();
        let first = render_certificate(&sample(), &opts).settle().await;
        let second = render_certificate(&sample(), &opts).settle().await;
        let a = rasterize(&first, &font).unwrap();
        let b = rasterize(&second, &font).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[tokio::test]
    async fn unresolved_qr_region_is_left_blank() {
        let Some(page_font) = test_font() else { return };
        let font = page_font.font().unwrap();
        let mut settled = render_certificate(&sample(), &RenderOptions::default())
            .settle()
            .await;
        let with_qr = rasterize(&settled, &font).unwrap();
        settled.qr_raster = None;
        let without_qr = rasterize(&settled, &font).unwrap();
        assert_ne!(with_qr.as_raw(), without_qr.as_raw());
        assert_eq!(without_qr.width(), PAGE_WIDTH_PX);
    }
}
