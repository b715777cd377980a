//! Layout document model.
//!
//! Elements are positioned in millimetres on the physical page. The
//! `display_scale` only affects the preview size reported to viewers;
//! capture backends work from the millimetre geometry and their own fixed
//! pixel grid, so scaling a preview can never change the exported output.

use crate::{CSS_PX_PER_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

/// Horizontal anchoring of a text run.
///
/// `x_mm` is the anchor: left edge for `Left`, centre for `Center`, right
/// edge for `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub x_mm: f32,
    pub y_mm: f32,
    /// Nominal glyph height in millimetres.
    pub size_mm: f32,
    pub align: Align,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleElement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub thickness_mm: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameElement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    pub thickness_mm: f32,
}

/// A reserved square region for the verification QR raster.
#[derive(Debug, Clone, PartialEq)]
pub struct QrElement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub payload: String,
    pub width_px: u32,
    pub margin_modules: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    Rule(RuleElement),
    Frame(FrameElement),
    Qr(QrElement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDocument {
    pub width_mm: f32,
    pub height_mm: f32,
    pub display_scale: f32,
    pub elements: Vec<Element>,
}

impl LayoutDocument {
    /// Empty A4 portrait document at display scale 1.0.
    pub fn a4() -> Self {
        Self {
            width_mm: PAGE_WIDTH_MM,
            height_mm: PAGE_HEIGHT_MM,
            display_scale: 1.0,
            elements: Vec::new(),
        }
    }

    pub fn with_display_scale(mut self, scale: f32) -> Self {
        self.display_scale = scale;
        self
    }

    /// Preview size in CSS pixels at the current display scale.
    pub fn preview_size(&self) -> (u32, u32) {
        let w = (self.width_mm * CSS_PX_PER_MM * self.display_scale).round() as u32;
        let h = (self.height_mm * CSS_PX_PER_MM * self.display_scale).round() as u32;
        (w, h)
    }

    /// The verification QR region, if the document carries one.
    pub fn qr(&self) -> Option<&QrElement> {
        self.elements.iter().find_map(|e| match e {
            Element::Qr(q) => Some(q),
            _ => None,
        })
    }

    pub fn text(&mut self, x_mm: f32, y_mm: f32, size_mm: f32, align: Align, content: impl Into<String>) {
        self.elements.push(Element::Text(TextElement {
            x_mm,
            y_mm,
            size_mm,
            align,
            content: content.into(),
        }));
    }

    pub fn rule(&mut self, x_mm: f32, y_mm: f32, width_mm: f32, thickness_mm: f32) {
        self.elements.push(Element::Rule(RuleElement {
            x_mm,
            y_mm,
            width_mm,
            thickness_mm,
        }));
    }

    pub fn frame(&mut self, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32, thickness_mm: f32) {
        self.elements.push(Element::Frame(FrameElement {
            x_mm,
            y_mm,
            width_mm,
            height_mm,
            thickness_mm,
        }));
    }

    pub fn qr_region(&mut self, x_mm: f32, y_mm: f32, payload: impl Into<String>, width_px: u32, margin_modules: u32) {
        self.elements.push(Element::Qr(QrElement {
            x_mm,
            y_mm,
            payload: payload.into(),
            width_px,
            margin_modules,
        }));
    }
}
