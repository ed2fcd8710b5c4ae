//! One-page PDF encoder for the document artifact.
//!
//! The page is sized to the bitmap in user units (one unit per pixel) and the
//! bitmap is placed full-bleed as an RGB image XObject, with its alpha channel
//! as a soft mask.

#[cfg(test)]
#[path = "pdf_test.rs"]
mod pdf_test;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use serde::Serialize;

use crate::consts::PDF_MAX_PAGE_SIDE;
use crate::export::ExportError;
use crate::render::Bitmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Portrait when taller than wide, otherwise landscape.
    #[must_use]
    pub fn for_size(width: u32, height: u32) -> Self {
        if height > width { Self::Portrait } else { Self::Landscape }
    }
}

/// An encoded single-page document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentArtifact {
    pub bytes: Vec<u8>,
    pub page_width: u32,
    pub page_height: u32,
    pub orientation: Orientation,
}

/// Encode `bitmap` as a one-page PDF.
///
/// # Errors
///
/// Returns `PageTooLarge` when a side exceeds what PDF viewers must support,
/// or `DocumentEncode` if serialization fails.
pub fn encode_pdf(bitmap: &Bitmap) -> Result<DocumentArtifact, ExportError> {
    let (w, h) = (bitmap.width, bitmap.height);
    if w > PDF_MAX_PAGE_SIDE || h > PDF_MAX_PAGE_SIDE {
        return Err(ExportError::PageTooLarge { width: w, height: h, max: PDF_MAX_PAGE_SIDE });
    }
    let encode_err = |e: lopdf::Error| ExportError::DocumentEncode(e.to_string());

    let mut rgb = Vec::with_capacity(bitmap.rgba.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(bitmap.rgba.len() / 4);
    for px in bitmap.rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut smask = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(w),
            "Height" => i64::from(h),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8_i64,
        },
        alpha,
    );
    smask.compress().map_err(encode_err)?;
    let smask_id = doc.add_object(smask);

    let mut image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(w),
            "Height" => i64::from(h),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "SMask" => smask_id,
        },
        rgb,
    );
    image.compress().map_err(encode_err)?;
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![i64::from(w).into(), 0_i64.into(), 0_i64.into(), i64::from(h).into(), 0_i64.into(), 0_i64.into()],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(encode_err)?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), i64::from(w).into(), i64::from(h).into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| ExportError::DocumentEncode(e.to_string()))?;

    Ok(DocumentArtifact { bytes, page_width: w, page_height: h, orientation: Orientation::for_size(w, h) })
}
