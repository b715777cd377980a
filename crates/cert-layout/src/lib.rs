//! Canonical certificate layout.
//!
//! A certificate is composed once into a [`LayoutDocument`], a tree of
//! positioned elements on a fixed A4 page measured in millimetres. The same
//! document drives every consumer: on-screen preview, PDF export and the
//! verification confirmation view. Consumers may scale the document for
//! display, but the composed geometry never changes.

pub mod compose;
pub mod data;
pub mod document;
pub mod qr;
pub mod render;

pub use compose::certificate_layout;
pub use data::CertificateData;
pub use document::{
    Align, Element, FrameElement, LayoutDocument, QrElement, RuleElement, TextElement,
};
pub use qr::{QrError, QrOptions, encode_qr, encode_qr_png, verification_url};
pub use render::{
    DEFAULT_ISSUER, RenderOptions, RenderedDocument, SettledDocument, render_certificate,
};

/// Physical page width, A4 portrait.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// Physical page height, A4 portrait.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// CSS reference pixel density used for preview sizing (96 dpi).
pub const CSS_PX_PER_MM: f32 = 96.0 / 25.4;
