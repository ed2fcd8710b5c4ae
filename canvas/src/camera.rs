#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Zoom state of the design surface.
///
/// The surface is never panned: screen origin and canvas origin coincide and
/// `zoom` is the only scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self { zoom }
    }

    /// Whether the zoom factor can be divided by.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0
    }

    /// Convert a screen-space point (CSS pixels) to canvas coordinates.
    ///
    /// Returns `None` when the zoom is degenerate or the result is not finite.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Option<Point> {
        if !self.is_usable() {
            return None;
        }
        let p = Point { x: screen.x / self.zoom, y: screen.y / self.zoom };
        p.is_finite().then_some(p)
    }

    /// Convert a screen-space distance (pixels) to canvas-space distance.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        if self.is_usable() { screen_dist / self.zoom } else { screen_dist }
    }
}
