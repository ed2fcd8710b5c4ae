//! Composite renderer: projects the scene onto the product mockup.
//!
//! This module turns a read-only [`Scene`] into a [`Composite`], a flat,
//! backend-independent paint list in canvas units: the mockup surface, every
//! element in ascending layer order with its own transform and opacity, and
//! (in editor mode only) the editor chrome. It never mutates the scene.
//!
//! Pixels are produced behind the [`OffscreenRenderer`] trait so the host can
//! supply its own rasterizer. [`crate::raster::SkiaRenderer`] is the bundled
//! implementation.
//!
//! The view transform maps canvas space onto the mockup:
//!
//! - `front`: identity
//! - `back`: 180° yaw, i.e. mirrored about the vertical center line
//! - `threeD`: yaw `rotation_3d` with a fixed pitch, as an affine projection
//!   about the canvas center (horizontal scale `cos(yaw)`, vertical scale
//!   `cos(pitch)`)

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::Point;
use crate::color::{self, Rgba};
use crate::consts::{GRID_SIZE, HANDLE_SIZE_PX, THREE_D_PITCH_DEG};
use crate::doc::{CanvasSettings, DesignElement, ElementId, ElementPayload, Scene, ViewMode};
use crate::error::ErrorCode;
use crate::geom::Geometry;
use crate::hit;
use crate::product::ProductConfig;

// =============================================================
// Errors
// =============================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} surface at scale {scale}")]
    InvalidSurface { width: f64, height: f64, scale: f32 },
    #[error("rasterizer failed: {0}")]
    Backend(String),
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSurface { .. } => "E_RENDER_SURFACE",
            Self::Backend(_) => "E_RENDER_BACKEND",
        }
    }
}

// =============================================================
// Affine
// =============================================================

/// 2D affine transform mapping `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    #[must_use]
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self { e: tx, f: ty, ..Self::IDENTITY }
    }

    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Clockwise rotation in screen coordinates (y down).
    #[must_use]
    pub fn rotate_deg(deg: f64) -> Self {
        let (sin, cos) = deg.to_radians().sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    /// Apply `self` first, then `next`.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        Self {
            a: next.a.mul_add(self.a, next.c * self.b),
            b: next.b.mul_add(self.a, next.d * self.b),
            c: next.a.mul_add(self.c, next.c * self.d),
            d: next.b.mul_add(self.c, next.d * self.d),
            e: next.a.mul_add(self.e, next.c.mul_add(self.f, next.e)),
            f: next.b.mul_add(self.e, next.d.mul_add(self.f, next.f)),
        }
    }

    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a.mul_add(p.x, self.c.mul_add(p.y, self.e)), self.b.mul_add(p.x, self.d.mul_add(p.y, self.f)))
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a.mul_add(self.d, -(self.b * self.c))
    }

    /// Whether the transform maps area to area (finite and non-degenerate).
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > f64::EPSILON && self.e.is_finite() && self.f.is_finite()
    }
}

/// Element-local space (origin at the frame's top-left) to canvas space,
/// rotating about the frame center.
#[must_use]
pub fn element_transform(geom: &Geometry) -> Affine {
    let c = geom.center();
    Affine::translate(-geom.width / 2.0, -geom.height / 2.0)
        .then(Affine::rotate_deg(crate::geom::normalize_rotation(geom.rotation)))
        .then(Affine::translate(c.x, c.y))
}

/// Canvas space to mockup space for the active view.
#[must_use]
pub fn view_transform(settings: &CanvasSettings) -> Affine {
    let cx = settings.canvas_width / 2.0;
    let cy = settings.canvas_height / 2.0;
    match settings.active_view {
        ViewMode::Front => Affine::IDENTITY,
        ViewMode::Back => Affine::translate(-cx, 0.0).then(Affine::scale(-1.0, 1.0)).then(Affine::translate(cx, 0.0)),
        ViewMode::ThreeD => {
            let yaw = settings.rotation_3d.to_radians().cos();
            let pitch = THREE_D_PITCH_DEG.to_radians().cos();
            Affine::translate(-cx, -cy).then(Affine::scale(yaw, pitch)).then(Affine::translate(cx, cy))
        }
    }
}

// =============================================================
// Composite
// =============================================================

/// Whether editor chrome is included in a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeMode {
    /// Live editor preview: grid, selection outline, handles, size readout.
    Editor,
    /// Deliverable output: elements and mockup only.
    Export,
}

/// One element ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintItem {
    pub id: ElementId,
    /// Element-local to canvas space.
    pub transform: Affine,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub payload: ElementPayload,
}

/// Editor-only overlay, in canvas units.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    Grid { spacing: f64 },
    SelectionOutline { transform: Affine, width: f64, height: f64, locked: bool },
    Handle { center: Point, size: f64 },
    SizeLabel { anchor: Point, text: String },
}

/// A flattened, backend-independent description of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub width: f64,
    pub height: f64,
    /// Product base color painted as the mockup surface.
    pub surface: Rgba,
    /// Canvas to mockup projection for the active view.
    pub view: Affine,
    /// Elements in paint order.
    pub items: Vec<PaintItem>,
    pub decorations: Vec<Decoration>,
}

impl Composite {
    /// Pixel size of this composite rendered at `scale`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSurface` for a non-finite or non-positive result.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self, scale: f32) -> Result<(u32, u32), RenderError> {
        let invalid = || RenderError::InvalidSurface { width: self.width, height: self.height, scale };
        let w = (self.width * f64::from(scale)).ceil();
        let h = (self.height * f64::from(scale)).ceil();
        if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
            return Err(invalid());
        }
        Ok((w as u32, h as u32))
    }

    #[must_use]
    pub fn has_chrome(&self) -> bool {
        !self.decorations.is_empty()
    }
}

/// Build the composite for the current scene and product.
///
/// Locked elements are painted. The scene is only read.
#[must_use]
pub fn compose(scene: &Scene, product: &ProductConfig, mode: ChromeMode) -> Composite {
    let settings = &scene.settings;
    let items = scene.sorted_elements().into_iter().map(paint_item).collect();
    let decorations = match mode {
        ChromeMode::Editor => decorations(scene),
        ChromeMode::Export => Vec::new(),
    };

    Composite {
        width: settings.canvas_width,
        height: settings.canvas_height,
        surface: color::parse_or(&product.color, Rgba::WHITE),
        view: view_transform(settings),
        items,
        decorations,
    }
}

fn paint_item(element: &DesignElement) -> PaintItem {
    PaintItem {
        id: element.id,
        transform: element_transform(&element.geometry),
        width: element.geometry.width,
        height: element.geometry.height,
        opacity: element.opacity.clamp(0.0, 1.0),
        payload: element.payload.clone(),
    }
}

fn decorations(scene: &Scene) -> Vec<Decoration> {
    let mut out = Vec::new();
    if scene.settings.show_grid {
        out.push(Decoration::Grid { spacing: GRID_SIZE });
    }

    let Some(selected) = scene.selected() else {
        return out;
    };
    let g = &selected.geometry;
    out.push(Decoration::SelectionOutline {
        transform: element_transform(g),
        width: g.width,
        height: g.height,
        locked: selected.locked,
    });

    if !selected.locked {
        let zoom = scene.settings.zoom;
        let size = if zoom.is_finite() && zoom > 0.0 { HANDLE_SIZE_PX / zoom } else { HANDLE_SIZE_PX };
        out.extend(hit::handle_positions(g).into_iter().map(|(_, center)| Decoration::Handle { center, size }));
    }

    let bottom_center = crate::geom::to_canvas(g, Point::new(g.width / 2.0, g.height));
    out.push(Decoration::SizeLabel {
        anchor: Point::new(bottom_center.x, bottom_center.y + GRID_SIZE),
        text: format!("{} × {}", g.width.round(), g.height.round()),
    });
    out
}

// =============================================================
// Offscreen rendering
// =============================================================

/// Straight (non-premultiplied) RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    /// RGBA of one pixel, or `None` outside the bitmap.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Rasterizes a composite into a bitmap.
///
/// Implementations must be pure with respect to the composite: the same input
/// always yields the same pixels, and nothing outside the returned bitmap is
/// touched.
pub trait OffscreenRenderer: Send + Sync {
    /// Rasterize `composite` at `scale` pixels per canvas unit.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the surface cannot be produced.
    fn render_to_offscreen_surface(&self, composite: &Composite, scale: f32) -> Result<Bitmap, RenderError>;
}
