//! Paginated PDF assembly.
//!
//! Each page is one full-bleed JPEG raster placed on an A4 media box. Image
//! XObjects are named `Im1`, `Im2`, ... in page order, one per page.

use image::RgbaImage;
use image::buffer::ConvertBuffer;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::{A4_HEIGHT_PT, A4_WIDTH_PT, PressError};

const JPEG_QUALITY: u8 = 90;

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append one page backed by `raster`.
    ///
    /// The raster is re-encoded as JPEG and stretched over the whole media
    /// box, so its aspect ratio should already match A4.
    pub fn add_page(&mut self, raster: &RgbaImage) -> Result<(), PressError> {
        if raster.width() == 0 || raster.height() == 0 {
            return Err(PressError::ZeroDimensionRaster {
                width: raster.width(),
                height: raster.height(),
            });
        }
        // JPEG has no alpha channel.
        let rgb: image::RgbImage = raster.convert();
        let mut jpeg = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
        encoder.encode_image(&rgb)?;

        let image_name = format!("Im{}", self.page_ids.len() + 1);
        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => rgb.width() as i64,
                "Height" => rgb.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(A4_WIDTH_PT),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(A4_HEIGHT_PT),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(image_name.clone().into_bytes())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let resources = dictionary! {
            "XObject" => dictionary! { image_name.as_str() => image_id },
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(A4_WIDTH_PT),
                Object::Real(A4_HEIGHT_PT),
            ],
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Close the page tree and hand back the finished document.
    pub fn finish(mut self) -> Result<Document, PressError> {
        if self.page_ids.is_empty() {
            return Err(PressError::EmptyDocument);
        }
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        Ok(self.doc)
    }

    pub fn to_bytes(self) -> Result<Vec<u8>, PressError> {
        let mut doc = self.finish()?;
        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}
