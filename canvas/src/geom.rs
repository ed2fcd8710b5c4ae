//! Geometry kernel: pure functions over element frames.
//!
//! Everything here is deterministic and side-effect free. The interaction
//! engine composes these per pointer event; the renderer and hit-tester use
//! the same frame math so what is drawn is exactly what is hit.
//!
//! Coordinates are canvas-local units with the origin at the top-left of the
//! design surface, y pointing down. `rotation` is clockwise degrees around the
//! frame center and does not participate in resize or clamp math, which act on
//! the unrotated frame.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Position, size and rotation of one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Left edge of the unrotated frame.
    pub x: f64,
    /// Top edge of the unrotated frame.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the frame center.
    #[serde(default)]
    pub rotation: f64,
}

impl Geometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, rotation: 0.0 }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// All five components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite()
    }

    /// Width and height are strictly positive and finite.
    #[must_use]
    pub fn has_valid_size(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// One of the eight resize handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    /// Every handle, clockwise from the top edge.
    pub const ALL: [ResizeHandle; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// CSS cursor name shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }

    /// Handle position relative to the frame's top-left corner, unrotated.
    #[must_use]
    pub fn local_position(self, width: f64, height: f64) -> Point {
        let x = if self.moves_west() {
            0.0
        } else if self.moves_east() {
            width
        } else {
            width / 2.0
        };
        let y = if self.moves_north() {
            0.0
        } else if self.moves_south() {
            height
        } else {
            height / 2.0
        };
        Point::new(x, y)
    }
}

// =============================================================
// Snapping and clamping
// =============================================================

/// Round `value` to the nearest multiple of `grid`.
///
/// A non-positive or non-finite grid leaves the value unchanged.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    if !(grid.is_finite() && grid > 0.0) {
        return value;
    }
    (value / grid).round() * grid
}

/// Clamp the origin so the frame lies within `[0, w] x [0, h]`.
///
/// Only position changes. A frame larger than the container is pinned to the
/// origin on that axis and overhangs the far edge.
#[must_use]
pub fn clamp_to_bounds(geom: Geometry, container_w: f64, container_h: f64) -> Geometry {
    let x = geom.x.min(container_w - geom.width).max(0.0);
    let y = geom.y.min(container_h - geom.height).max(0.0);
    Geometry { x, y, ..geom }
}

/// Snap the origin to the grid and keep the frame inside the container.
///
/// Where the nearest grid line would push the frame past the far edge, the
/// origin drops to the last grid line that still fits. A frame larger than the
/// container is pinned to the origin.
#[must_use]
pub fn snap_within(geom: Geometry, grid: f64, container_w: f64, container_h: f64) -> Geometry {
    if !(grid.is_finite() && grid > 0.0) {
        return clamp_to_bounds(geom, container_w, container_h);
    }
    let fit = |value: f64, size: f64, limit: f64| {
        let max = (limit - size).max(0.0);
        let snapped = snap(value, grid).max(0.0);
        if snapped > max { (max / grid).floor() * grid } else { snapped }
    };
    Geometry { x: fit(geom.x, geom.width, container_w), y: fit(geom.y, geom.height, container_h), ..geom }
}

/// Center the frame inside the container. Size and rotation are untouched.
#[must_use]
pub fn center_in(container_w: f64, container_h: f64, geom: Geometry) -> Geometry {
    Geometry { x: (container_w - geom.width) / 2.0, y: (container_h - geom.height) / 2.0, ..geom }
}

// =============================================================
// Resize
// =============================================================

/// Resize a frame by dragging `handle` by `(dx, dy)` canvas units.
///
/// East/south edges move with the pointer. West/north edges move with the
/// pointer while the opposite edge stays put, so those handles adjust both
/// origin and size. Each dimension is floored at `min_size`; once floored, the
/// anchor edge still does not move.
#[must_use]
pub fn resize_from_handle(geom: Geometry, handle: ResizeHandle, dx: f64, dy: f64, min_size: f64) -> Geometry {
    let mut out = geom;

    if handle.moves_east() {
        out.width = (geom.width + dx).max(min_size);
    } else if handle.moves_west() {
        let right = geom.right();
        out.width = (geom.width - dx).max(min_size);
        out.x = right - out.width;
    }

    if handle.moves_south() {
        out.height = (geom.height + dy).max(min_size);
    } else if handle.moves_north() {
        let bottom = geom.bottom();
        out.height = (geom.height - dy).max(min_size);
        out.y = bottom - out.height;
    }

    out
}

/// Snap the edges a handle moves, keeping the anchor edges exact.
///
/// East/south handles snap the size; west/north handles snap the origin and
/// derive the size from the fixed opposite edge.
#[must_use]
pub fn snap_resize(geom: Geometry, handle: ResizeHandle, grid: f64, min_size: f64) -> Geometry {
    let mut out = geom;

    if handle.moves_east() {
        out.width = snap(geom.width, grid).max(min_size);
    } else if handle.moves_west() {
        let right = geom.right();
        out.width = (right - snap(geom.x, grid)).max(min_size);
        out.x = right - out.width;
    }

    if handle.moves_south() {
        out.height = snap(geom.height, grid).max(min_size);
    } else if handle.moves_north() {
        let bottom = geom.bottom();
        out.height = (bottom - snap(geom.y, grid)).max(min_size);
        out.y = bottom - out.height;
    }

    out
}

/// Pull the edges a handle moves back inside the container.
///
/// Anchor edges are never moved, so a resize pushed past the canvas edge
/// stops at the edge instead of sliding the whole frame.
#[must_use]
pub fn fit_resize(
    geom: Geometry,
    handle: ResizeHandle,
    container_w: f64,
    container_h: f64,
    min_size: f64,
) -> Geometry {
    let mut out = geom;

    if handle.moves_east() && out.right() > container_w {
        out.width = (container_w - out.x).max(min_size);
    } else if handle.moves_west() && out.x < 0.0 {
        let right = out.right();
        out.width = right.max(min_size);
        out.x = right - out.width;
    }

    if handle.moves_south() && out.bottom() > container_h {
        out.height = (container_h - out.y).max(min_size);
    } else if handle.moves_north() && out.y < 0.0 {
        let bottom = out.bottom();
        out.height = bottom.max(min_size);
        out.y = bottom - out.height;
    }

    out
}

// =============================================================
// Rotation
// =============================================================

/// Map any angle in degrees into `[-180, 180)`.
#[must_use]
pub fn normalize_rotation(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Rotate a frame by `delta` degrees, normalizing the result.
#[must_use]
pub fn rotate_delta(geom: Geometry, delta: f64) -> Geometry {
    Geometry { rotation: normalize_rotation(geom.rotation + delta), ..geom }
}

/// Express a canvas point in the frame's unrotated local space
/// (origin at the frame's top-left corner).
#[must_use]
pub fn to_local(geom: &Geometry, p: Point) -> Point {
    let c = geom.center();
    let (sin, cos) = (-geom.rotation.to_radians()).sin_cos();
    let dx = p.x - c.x;
    let dy = p.y - c.y;
    Point::new(
        dx.mul_add(cos, -dy * sin) + geom.width / 2.0,
        dx.mul_add(sin, dy * cos) + geom.height / 2.0,
    )
}

/// Inverse of [`to_local`].
#[must_use]
pub fn to_canvas(geom: &Geometry, local: Point) -> Point {
    let c = geom.center();
    let (sin, cos) = geom.rotation.to_radians().sin_cos();
    let dx = local.x - geom.width / 2.0;
    let dy = local.y - geom.height / 2.0;
    Point::new(dx.mul_add(cos, -dy * sin) + c.x, dx.mul_add(sin, dy * cos) + c.y)
}

/// Whether `p` lies inside the rotated frame (edges inclusive).
#[must_use]
pub fn contains_point(geom: &Geometry, p: Point) -> bool {
    let local = to_local(geom, p);
    (0.0..=geom.width).contains(&local.x) && (0.0..=geom.height).contains(&local.y)
}
