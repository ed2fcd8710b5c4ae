//! Uploaded raster validation and `data:` URI encoding.
//!
//! Uploads are checked for size before any decoding work, sniffed by magic
//! bytes (not by file name), fully decoded once to prove they are readable, and
//! then embedded verbatim as a base64 `data:` URI in an image payload.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::error::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("image is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("uploaded file is empty")]
    Empty,
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("image could not be decoded: {0}")]
    Decode(String),
    #[error("malformed data URI")]
    InvalidDataUri,
}

impl ErrorCode for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "E_UPLOAD_TOO_LARGE",
            Self::Empty => "E_UPLOAD_EMPTY",
            Self::UnsupportedFormat => "E_UPLOAD_FORMAT",
            Self::Decode(_) => "E_UPLOAD_DECODE",
            Self::InvalidDataUri => "E_DATA_URI",
        }
    }
}

/// A validated upload ready to become an image element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub data_uri: String,
    /// Intrinsic pixel width.
    pub width: u32,
    /// Intrinsic pixel height.
    pub height: u32,
}

const ACCEPTED: [ImageFormat; 4] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif, ImageFormat::WebP];

/// Validate raw upload bytes and embed them as a data URI.
///
/// # Errors
///
/// Returns `Empty`, `TooLarge` (checked before decoding), `UnsupportedFormat`
/// or `Decode`.
pub fn decode_upload(bytes: &[u8], max_bytes: usize) -> Result<ImageUpload, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        tracing::warn!(size = bytes.len(), max = max_bytes, "upload rejected: too large");
        return Err(UploadError::TooLarge { size: bytes.len(), max: max_bytes });
    }

    let format = image::guess_format(bytes).map_err(|_| UploadError::UnsupportedFormat)?;
    if !ACCEPTED.contains(&format) {
        tracing::warn!(?format, "upload rejected: unsupported format");
        return Err(UploadError::UnsupportedFormat);
    }

    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        tracing::warn!(error = %e, "upload rejected: decode failed");
        UploadError::Decode(e.to_string())
    })?;

    tracing::debug!(size = bytes.len(), width = decoded.width(), height = decoded.height(), "upload accepted");
    Ok(ImageUpload {
        data_uri: format!("data:{};base64,{}", format.to_mime_type(), STANDARD.encode(bytes)),
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Extract the raw bytes from a base64 `data:` URI.
///
/// # Errors
///
/// Returns `InvalidDataUri` when the URI is not base64 `data:` form.
pub fn decode_data_uri(src: &str) -> Result<Vec<u8>, UploadError> {
    let rest = src.strip_prefix("data:").ok_or(UploadError::InvalidDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(UploadError::InvalidDataUri)?;
    if !meta.ends_with(";base64") {
        return Err(UploadError::InvalidDataUri);
    }
    STANDARD.decode(payload.trim()).map_err(|_| UploadError::InvalidDataUri)
}
