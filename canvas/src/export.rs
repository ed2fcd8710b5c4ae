//! Export pipeline: one rasterization, two independent artifacts.
//!
//! The scene is composed without editor chrome, rasterized once at the
//! supersampling scale, and the bitmap is then encoded as a PNG (raster
//! artifact) and as a one-page PDF (document artifact). Each encoder runs even
//! if the other failed; failures are collected in the [`ExportReport`] instead
//! of aborting the export.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::time::Instant;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::doc::Scene;
use crate::error::{ErrorCode, Notice};
use crate::pdf::{self, DocumentArtifact};
use crate::product::ProductConfig;
use crate::render::{Bitmap, ChromeMode, OffscreenRenderer, RenderError, compose};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("capture failed: {0}")]
    Render(#[from] RenderError),
    #[error("PNG encoding failed: {0}")]
    RasterEncode(String),
    #[error("PDF encoding failed: {0}")]
    DocumentEncode(String),
    #[error("page {width}x{height} exceeds the {max} unit limit")]
    PageTooLarge { width: u32, height: u32, max: u32 },
    #[error("export task failed: {0}")]
    TaskFailed(String),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Render(_) => "E_CAPTURE",
            Self::RasterEncode(_) => "E_RASTER_ENCODE",
            Self::DocumentEncode(_) => "E_DOCUMENT_ENCODE",
            Self::PageTooLarge { .. } => "E_PAGE_TOO_LARGE",
            Self::TaskFailed(_) => "E_EXPORT_TASK",
        }
    }
}

/// Lossless PNG of the composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterArtifact {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Both artifacts were produced.
    Complete,
    /// Exactly one artifact was produced.
    Partial,
    /// Neither artifact was produced.
    Failed,
}

/// Best-effort result set of one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub raster: Option<RasterArtifact>,
    pub document: Option<DocumentArtifact>,
    pub errors: Vec<ExportError>,
}

impl ExportReport {
    /// A report with no artifacts and a single error.
    #[must_use]
    pub fn failed(err: ExportError) -> Self {
        Self { raster: None, document: None, errors: vec![err] }
    }

    #[must_use]
    pub fn outcome(&self) -> ExportOutcome {
        match (self.raster.is_some(), self.document.is_some()) {
            (true, true) => ExportOutcome::Complete,
            (false, false) => ExportOutcome::Failed,
            _ => ExportOutcome::Partial,
        }
    }

    /// One transient notice per failure.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.errors.iter().map(Notice::from_error).collect()
    }
}

/// Encode a bitmap as PNG.
///
/// # Errors
///
/// Returns `RasterEncode` if the encoder rejects the buffer.
pub fn encode_png(bitmap: &Bitmap) -> Result<RasterArtifact, ExportError> {
    let expected = u64::from(bitmap.width) * u64::from(bitmap.height) * 4;
    if bitmap.rgba.len() as u64 != expected {
        return Err(ExportError::RasterEncode(format!(
            "buffer holds {} bytes, {}x{} RGBA needs {expected}",
            bitmap.rgba.len(),
            bitmap.width,
            bitmap.height
        )));
    }
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&bitmap.rgba, bitmap.width, bitmap.height, ExtendedColorType::Rgba8)
        .map_err(|e| ExportError::RasterEncode(e.to_string()))?;
    Ok(RasterArtifact { bytes, width: bitmap.width, height: bitmap.height })
}

/// Export the scene as PNG and PDF artifacts.
///
/// Always composes without editor chrome and never mutates the scene. Never
/// fails as a whole: inspect [`ExportReport::outcome`] and `errors`.
pub fn export_design(
    scene: &Scene,
    product: &ProductConfig,
    renderer: &dyn OffscreenRenderer,
    scale: f32,
) -> ExportReport {
    let started = Instant::now();
    let composite = compose(scene, product, ChromeMode::Export);
    debug_assert!(!composite.has_chrome(), "export composite carries editor chrome");

    let bitmap = match renderer.render_to_offscreen_surface(&composite, scale) {
        Ok(bitmap) => bitmap,
        Err(e) => {
            tracing::warn!(error = %e, "export capture failed");
            return ExportReport::failed(e.into());
        }
    };

    let mut report = ExportReport::default();
    match encode_png(&bitmap) {
        Ok(raster) => report.raster = Some(raster),
        Err(e) => {
            tracing::warn!(error = %e, "raster artifact failed");
            report.errors.push(e);
        }
    }
    match pdf::encode_pdf(&bitmap) {
        Ok(document) => report.document = Some(document),
        Err(e) => {
            tracing::warn!(error = %e, "document artifact failed");
            report.errors.push(e);
        }
    }

    tracing::info!(
        width = bitmap.width,
        height = bitmap.height,
        elements = composite.items.len(),
        png_bytes = report.raster.as_ref().map_or(0, |r| r.bytes.len()),
        pdf_bytes = report.document.as_ref().map_or(0, |d| d.bytes.len()),
        outcome = ?report.outcome(),
        elapsed_ms = started.elapsed().as_millis(),
        "export finished"
    );
    report
}
