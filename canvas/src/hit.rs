#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ElementId, Scene};
use crate::geom::{self, ResizeHandle};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test which element (if any) is under `canvas_pt`.
///
/// Handles of the selected element are checked first so a handle that overlaps
/// another element still starts a resize. Bodies are checked top-down in paint
/// order. Locked elements are never hit.
#[must_use]
pub fn hit_test(canvas_pt: Point, scene: &Scene, camera: &Camera) -> Option<Hit> {
    if let Some(selected) = scene.selected().filter(|e| !e.locked) {
        if let Some(handle) = handle_at(canvas_pt, &selected.geometry, camera) {
            return Some(Hit { element_id: selected.id, part: HitPart::ResizeHandle(handle) });
        }
    }

    scene
        .sorted_elements()
        .into_iter()
        .rev()
        .filter(|e| !e.locked)
        .find(|e| geom::contains_point(&e.geometry, canvas_pt))
        .map(|e| Hit { element_id: e.id, part: HitPart::Body })
}

/// Handle under `canvas_pt` for a frame, using a zoom-independent screen slop.
#[must_use]
pub fn handle_at(canvas_pt: Point, frame: &geom::Geometry, camera: &Camera) -> Option<ResizeHandle> {
    let radius = camera.screen_dist_to_canvas(HANDLE_RADIUS_PX);
    let local = geom::to_local(frame, canvas_pt);
    ResizeHandle::ALL.into_iter().find(|handle| {
        let h = handle.local_position(frame.width, frame.height);
        (local.x - h.x).hypot(local.y - h.y) <= radius
    })
}

/// Canvas-space positions of all eight handles for a frame.
#[must_use]
pub fn handle_positions(frame: &geom::Geometry) -> [(ResizeHandle, Point); 8] {
    ResizeHandle::ALL.map(|handle| (handle, geom::to_canvas(frame, handle.local_position(frame.width, frame.height))))
}
