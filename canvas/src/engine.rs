use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::camera::{Camera, Point};
use crate::consts::{
    AUTO_ROTATE_INTERVAL_MS, AUTO_ROTATE_STEP_DEG, EXPORT_SCALE, GRID_SIZE, MAX_UPLOAD_BYTES, MIN_ELEMENT_SIZE,
    ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
use crate::doc::{
    CanvasSettings, DesignElement, ElementId, ElementPayload, ImagePayload, PartialElement, Reorder, Scene,
    SceneError, ShapePayload, ShapeType, TextPayload, ViewMode,
};
use crate::error::{ErrorCode, Notice};
use crate::export::{self, ExportError, ExportReport};
use crate::geom::{self, Geometry};
use crate::hit::{self, HitPart};
use crate::input::{Button, InputState, Key, Modifiers, UiState};
use crate::product::{self, PricingSignal, ProductConfig};
use crate::render::{ChromeMode, Composite, OffscreenRenderer, compose};
use crate::snapshot::{DesignSnapshot, SnapshotError};
use crate::timer::AutoRotateTimer;
use crate::upload::{self, ImageUpload};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Width given to a freshly uploaded image; height follows its aspect ratio.
const IMAGE_TEMPLATE_WIDTH: f64 = 150.0;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated(DesignElement),
    /// An element's frame changed (drag, resize, nudge, center, rotate).
    ElementTransformed { id: ElementId, geometry: Geometry },
    ElementUpdated { id: ElementId, fields: PartialElement },
    ElementDeleted { id: ElementId },
    /// Layer values of one or more elements changed.
    LayersChanged,
    SelectionChanged(Option<ElementId>),
    SettingsChanged(CanvasSettings),
    /// Transient user-facing message; the scene is unchanged.
    Notice(Notice),
    SetCursor(String),
    RenderNeeded,
}

fn notice(err: &(impl ErrorCode + ?Sized)) -> Vec<Action> {
    vec![Action::Notice(Notice::from_error(err))]
}

/// Core engine state: all logic that doesn't need a runtime or a rasterizer.
///
/// Separated from `Engine` so it can be tested synchronously.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub scene: Scene,
    pub product: ProductConfig,
    pub ui: UiState,
    pub input: InputState,
}

impl EngineCore {
    /// An empty studio for a base product.
    #[must_use]
    pub fn new(product: ProductConfig) -> Self {
        Self { product, ..Self::default() }
    }

    /// Camera for the current zoom.
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::new(self.scene.settings.zoom)
    }

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.scene.selected_id()
    }

    /// Look up an element by ID.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&DesignElement> {
        self.scene.get(id)
    }

    fn busy(&self) -> Option<Vec<Action>> {
        self.ui.exporting.then(|| notice(&SceneError::Busy))
    }

    fn canvas_size(&self) -> (f64, f64) {
        (self.scene.settings.canvas_width, self.scene.settings.canvas_height)
    }

    /// Keep a moved frame inside the canvas, on the grid when snap is on.
    fn place(&self, geom: Geometry) -> Geometry {
        let (cw, ch) = self.canvas_size();
        if self.scene.settings.snap_to_grid {
            geom::snap_within(geom, GRID_SIZE, cw, ch)
        } else {
            geom::clamp_to_bounds(geom, cw, ch)
        }
    }

    // =============================================================
    // Pointer input
    // =============================================================

    /// Start a gesture: resize on a handle of the selected element, drag on
    /// an element body, or clear the selection on empty canvas.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        if let Some(busy) = self.busy() {
            return busy;
        }
        let Some(pt) = self.camera().screen_to_canvas(screen_pt) else {
            return Vec::new();
        };

        let Some(hit) = hit::hit_test(pt, &self.scene, &self.camera()) else {
            return self.set_selection(None);
        };
        let Some(element) = self.scene.get(&hit.element_id) else {
            return Vec::new();
        };
        let start_geometry = element.geometry;

        match hit.part {
            HitPart::ResizeHandle(handle) => {
                tracing::debug!(id = %hit.element_id, ?handle, "resize started");
                self.input = InputState::Resizing { id: hit.element_id, handle, start_geometry, start_pointer: pt };
                vec![Action::SetCursor(handle.cursor().to_owned())]
            }
            HitPart::Body => {
                tracing::debug!(id = %hit.element_id, "drag started");
                let mut actions = self.set_selection(Some(hit.element_id));
                self.input = InputState::Dragging {
                    id: hit.element_id,
                    offset: Point::new(pt.x - start_geometry.x, pt.y - start_geometry.y),
                };
                actions.push(Action::SetCursor("move".into()));
                actions
            }
        }
    }

    /// Advance the active gesture, or update the hover cursor when idle.
    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let Some(pt) = self.camera().screen_to_canvas(screen_pt) else {
            return Vec::new();
        };
        match self.input.clone() {
            InputState::Idle => vec![Action::SetCursor(self.hover_cursor(pt).to_owned())],
            InputState::Dragging { id, offset } => self.drag_to(id, pt, offset),
            InputState::Resizing { id, handle, start_geometry, start_pointer } => {
                self.resize_to(id, handle, start_geometry, start_pointer, pt)
            }
        }
    }

    /// End the active gesture, applying the release position first.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || self.input.is_idle() {
            return Vec::new();
        }
        let mut actions = self.on_pointer_move(screen_pt, modifiers);
        actions.extend(self.end_gesture());
        actions
    }

    /// Pointer capture was lost; end the gesture keeping the last geometry.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        self.end_gesture()
    }

    fn end_gesture(&mut self) -> Vec<Action> {
        if let Some(id) = self.input.target() {
            tracing::debug!(%id, "gesture ended");
        }
        self.input = InputState::Idle;
        vec![Action::SetCursor("default".into()), Action::RenderNeeded]
    }

    fn hover_cursor(&self, pt: Point) -> &'static str {
        match hit::hit_test(pt, &self.scene, &self.camera()) {
            Some(hit) => match hit.part {
                HitPart::ResizeHandle(handle) => handle.cursor(),
                HitPart::Body => "move",
            },
            None => "default",
        }
    }

    /// The element a gesture targets, if it is still present and unlocked.
    fn gesture_target(&mut self, id: ElementId) -> Option<Geometry> {
        match self.scene.get(&id) {
            Some(element) if !element.locked => Some(element.geometry),
            _ => {
                self.input = InputState::Idle;
                None
            }
        }
    }

    fn drag_to(&mut self, id: ElementId, pt: Point, offset: Point) -> Vec<Action> {
        let Some(current) = self.gesture_target(id) else {
            return Vec::new();
        };
        let next = Geometry { x: pt.x - offset.x, y: pt.y - offset.y, ..current };
        let next = self.place(next);
        self.write_geometry(id, current, next)
    }

    fn resize_to(
        &mut self,
        id: ElementId,
        handle: geom::ResizeHandle,
        start: Geometry,
        start_pointer: Point,
        pt: Point,
    ) -> Vec<Action> {
        let Some(current) = self.gesture_target(id) else {
            return Vec::new();
        };
        // Pointer deltas are measured along the element's own axes.
        let (sin, cos) = (-start.rotation.to_radians()).sin_cos();
        let (dx, dy) = (pt.x - start_pointer.x, pt.y - start_pointer.y);
        let (ldx, ldy) = (dx.mul_add(cos, -dy * sin), dx.mul_add(sin, dy * cos));

        let mut next = geom::resize_from_handle(start, handle, ldx, ldy, MIN_ELEMENT_SIZE);
        if self.scene.settings.snap_to_grid {
            next = geom::snap_resize(next, handle, GRID_SIZE, MIN_ELEMENT_SIZE);
        }
        let (cw, ch) = self.canvas_size();
        next = geom::fit_resize(next, handle, cw, ch, MIN_ELEMENT_SIZE);
        self.write_geometry(id, current, next)
    }

    /// Write a new frame if it is valid and differs from the current one.
    fn write_geometry(&mut self, id: ElementId, current: Geometry, next: Geometry) -> Vec<Action> {
        if !next.is_finite() || next == current {
            return Vec::new();
        }
        debug_assert!(next.has_valid_size(), "kernel produced an invalid frame: {next:?}");
        match self.scene.apply_transform(&id, next) {
            Ok(()) => vec![Action::ElementTransformed { id, geometry: next }, Action::RenderNeeded],
            Err(e) => {
                tracing::warn!(%id, error = %e, "transform rejected");
                notice(&e)
            }
        }
    }

    // =============================================================
    // Keyboard
    // =============================================================

    /// `Delete`/`Backspace` delete the selection, `Escape` ends the gesture
    /// and clears the selection, arrows nudge (by the grid size with Shift).
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let step = if modifiers.shift { GRID_SIZE } else { 1.0 };
        match key.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => {
                let mut actions = if self.input.is_idle() { Vec::new() } else { self.end_gesture() };
                actions.extend(self.set_selection(None));
                actions
            }
            "ArrowLeft" => self.nudge_selected(-step, 0.0),
            "ArrowRight" => self.nudge_selected(step, 0.0),
            "ArrowUp" => self.nudge_selected(0.0, -step),
            "ArrowDown" => self.nudge_selected(0.0, step),
            _ => Vec::new(),
        }
    }

    fn nudge_selected(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        self.transform_selected(|g, core| core.place(Geometry { x: g.x + dx, y: g.y + dy, ..g }))
    }

    // =============================================================
    // Toolbox actions
    // =============================================================

    /// Add an element (selected afterwards). `geometry` defaults to the
    /// payload's template frame.
    pub fn add_element(&mut self, payload: ElementPayload, geometry: Option<Geometry>) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        let id = match self.scene.add_element(payload, geometry) {
            Ok(id) => id,
            Err(e) => return notice(&e),
        };
        let mut actions = Vec::new();
        if let Some(element) = self.scene.get(&id) {
            actions.push(Action::ElementCreated(element.clone()));
        }
        actions.extend(self.set_selection(Some(id)));
        actions
    }

    /// Add the default "Your Text" element.
    pub fn add_text(&mut self) -> Vec<Action> {
        self.add_element(ElementPayload::Text(TextPayload::default()), None)
    }

    /// Add a 100×100 shape with the default fill.
    pub fn add_shape(&mut self, shape: ShapeType) -> Vec<Action> {
        self.add_element(ElementPayload::Shape(ShapePayload { shape, ..ShapePayload::default() }), None)
    }

    /// Add a validated upload, 150 units wide with its aspect ratio kept.
    pub fn add_image(&mut self, upload: &ImageUpload) -> Vec<Action> {
        let payload = ElementPayload::Image(ImagePayload { src: upload.data_uri.clone() });
        let mut frame = payload.default_geometry();
        if upload.width > 0 && upload.height > 0 {
            frame.width = IMAGE_TEMPLATE_WIDTH;
            frame.height = IMAGE_TEMPLATE_WIDTH * f64::from(upload.height) / f64::from(upload.width);
        }
        let (cw, ch) = self.canvas_size();
        self.add_element(payload, Some(geom::clamp_to_bounds(frame, cw, ch)))
    }

    /// Select an element from outside the canvas (layers panel). Locked
    /// elements can be selected this way.
    pub fn select_element(&mut self, id: Option<ElementId>) -> Vec<Action> {
        if let Some(id) = id {
            if !self.scene.contains(&id) {
                return notice(&SceneError::NotFound(id));
            }
        }
        self.set_selection(id)
    }

    fn set_selection(&mut self, id: Option<ElementId>) -> Vec<Action> {
        if self.scene.selected_id() == id {
            return Vec::new();
        }
        match self.scene.select(id) {
            Ok(()) => vec![Action::SelectionChanged(id), Action::RenderNeeded],
            Err(e) => notice(&e),
        }
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        let Some(id) = self.scene.selected_id() else {
            return Vec::new();
        };
        if self.input.target() == Some(id) {
            self.input = InputState::Idle;
        }
        match self.scene.delete_element(&id) {
            Ok(_) => vec![Action::ElementDeleted { id }, Action::SelectionChanged(None), Action::RenderNeeded],
            Err(e) => notice(&e),
        }
    }

    /// Duplicate the selection and select the copy.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        let Some(id) = self.scene.selected_id() else {
            return Vec::new();
        };
        let copy_id = match self.scene.duplicate_element(&id) {
            Ok(copy_id) => copy_id,
            Err(e) => return notice(&e),
        };
        let mut actions = Vec::new();
        if let Some(copy) = self.scene.get(&copy_id) {
            actions.push(Action::ElementCreated(copy.clone()));
        }
        actions.extend(self.set_selection(Some(copy_id)));
        actions
    }

    pub fn bring_to_front(&mut self) -> Vec<Action> {
        self.reorder_selected(Reorder::ToFront)
    }

    pub fn send_to_back(&mut self) -> Vec<Action> {
        self.reorder_selected(Reorder::ToBack)
    }

    fn reorder_selected(&mut self, to: Reorder) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        let Some(id) = self.scene.selected_id() else {
            return Vec::new();
        };
        match self.scene.reorder(&id, to) {
            Ok(()) => vec![Action::LayersChanged, Action::RenderNeeded],
            Err(e) => notice(&e),
        }
    }

    /// Center the selection on the canvas.
    pub fn center_selected(&mut self) -> Vec<Action> {
        self.transform_selected(|g, core| {
            let (cw, ch) = core.canvas_size();
            geom::center_in(cw, ch, g)
        })
    }

    /// Rotate the selection by `delta` degrees.
    pub fn rotate_selected(&mut self, delta: f64) -> Vec<Action> {
        if !delta.is_finite() {
            return Vec::new();
        }
        self.transform_selected(|g, _| geom::rotate_delta(g, delta))
    }

    /// Apply a kernel function to the selected, unlocked element's frame.
    fn transform_selected(&mut self, f: impl FnOnce(Geometry, &Self) -> Geometry) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        let Some(element) = self.scene.selected() else {
            return Vec::new();
        };
        if element.locked {
            return Vec::new();
        }
        let (id, current) = (element.id, element.geometry);
        let next = f(current, self);
        self.write_geometry(id, current, next)
    }

    pub fn toggle_lock(&mut self) -> Vec<Action> {
        let Some(element) = self.scene.selected() else {
            return Vec::new();
        };
        let fields = PartialElement { locked: Some(!element.locked), ..PartialElement::default() };
        let id = element.id;
        if self.input.target() == Some(id) {
            self.input = InputState::Idle;
        }
        self.update(id, fields)
    }

    /// Set the selection's opacity (clamped to `[0, 1]`).
    pub fn set_opacity(&mut self, opacity: f64) -> Vec<Action> {
        let Some(id) = self.scene.selected_id() else {
            return Vec::new();
        };
        self.update(id, PartialElement { opacity: Some(opacity), ..PartialElement::default() })
    }

    /// Replace the selection's payload (fill, font, stroke, shadow, ...).
    pub fn set_style(&mut self, payload: ElementPayload) -> Vec<Action> {
        let Some(id) = self.scene.selected_id() else {
            return Vec::new();
        };
        self.update(id, PartialElement { payload: Some(payload), ..PartialElement::default() })
    }

    /// Commit edited text content. Blank content is refused and the previous
    /// content stays.
    pub fn commit_text(&mut self, id: &ElementId, content: &str) -> Vec<Action> {
        let Some(element) = self.scene.get(id) else {
            return notice(&SceneError::NotFound(*id));
        };
        let ElementPayload::Text(text) = &element.payload else {
            return notice(&SceneError::KindMismatch { expected: element.kind(), got: crate::doc::ElementKind::Text });
        };
        if content.trim().is_empty() {
            tracing::debug!(%id, "empty text commit reverted");
            return vec![Action::Notice(Notice::new("E_EMPTY_TEXT", "text cannot be empty"))];
        }
        let payload = ElementPayload::Text(TextPayload { content: content.to_owned(), ..text.clone() });
        self.update(*id, PartialElement { payload: Some(payload), ..PartialElement::default() })
    }

    fn update(&mut self, id: ElementId, fields: PartialElement) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        match self.scene.update_element(&id, &fields) {
            Ok(()) => vec![Action::ElementUpdated { id, fields }, Action::RenderNeeded],
            Err(e) => notice(&e),
        }
    }

    // =============================================================
    // Settings
    // =============================================================

    fn change_settings(&mut self, f: impl FnOnce(&mut CanvasSettings)) -> Vec<Action> {
        if let Some(busy) = self.busy() {
            return busy;
        }
        let before = self.scene.settings.clone();
        f(&mut self.scene.settings);
        if self.scene.settings == before {
            return Vec::new();
        }
        vec![Action::SettingsChanged(self.scene.settings.clone()), Action::RenderNeeded]
    }

    pub fn toggle_grid(&mut self) -> Vec<Action> {
        self.change_settings(|s| s.show_grid = !s.show_grid)
    }

    pub fn toggle_snap(&mut self) -> Vec<Action> {
        self.change_settings(|s| s.snap_to_grid = !s.snap_to_grid)
    }

    /// Set the zoom, clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        if !zoom.is_finite() {
            return vec![Action::Notice(Notice::new("E_INVALID_ZOOM", format!("zoom must be a number, got {zoom}")))];
        }
        self.change_settings(|s| s.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX))
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.set_zoom(round_zoom(self.scene.settings.zoom + ZOOM_STEP))
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.set_zoom(round_zoom(self.scene.settings.zoom - ZOOM_STEP))
    }

    pub fn set_view(&mut self, view: ViewMode) -> Vec<Action> {
        self.change_settings(|s| s.active_view = view)
    }

    /// Turn mockup auto-rotation on or off. It only runs in the 3D view.
    pub fn set_auto_rotate(&mut self, on: bool) {
        self.ui.auto_rotate = on;
    }

    /// Whether the auto-rotate timer should be running.
    #[must_use]
    pub fn auto_rotate_active(&self) -> bool {
        self.ui.auto_rotate && self.scene.settings.active_view == ViewMode::ThreeD
    }

    /// Advance the mockup yaw by one step. Ignored unless auto-rotate is
    /// active and no export is capturing.
    pub fn on_auto_rotate_tick(&mut self) -> Vec<Action> {
        if !self.auto_rotate_active() || self.ui.exporting {
            return Vec::new();
        }
        self.change_settings(|s| s.rotation_3d = (s.rotation_3d + AUTO_ROTATE_STEP_DEG).rem_euclid(360.0))
    }

    // =============================================================
    // Export, pricing, snapshots
    // =============================================================

    /// Freeze edits and hand out the state to capture.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Busy` if an export is already in flight.
    pub fn begin_export(&mut self) -> Result<(Scene, ProductConfig), SceneError> {
        if self.ui.exporting {
            return Err(SceneError::Busy);
        }
        self.input = InputState::Idle;
        self.ui.exporting = true;
        tracing::info!(elements = self.scene.len(), "export started");
        Ok((self.scene.clone(), self.product.clone()))
    }

    /// Unfreeze edits and surface per-artifact failures as notices.
    pub fn finish_export(&mut self, report: &ExportReport) -> Vec<Action> {
        self.ui.exporting = false;
        report.notices().into_iter().map(Action::Notice).collect()
    }

    /// Live editor composite, chrome included.
    #[must_use]
    pub fn preview(&self) -> Composite {
        compose(&self.scene, &self.product, ChromeMode::Editor)
    }

    #[must_use]
    pub fn pricing(&self, quantity: u32, flat_fee: f64) -> PricingSignal {
        product::pricing(&self.scene, &self.product, quantity, flat_fee)
    }

    #[must_use]
    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot::capture(&self.scene, &self.product)
    }

    /// Replace the scene and product with a committed snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScene` if the snapshot breaks a scene invariant, in
    /// which case nothing changes.
    pub fn load_snapshot(&mut self, snapshot: DesignSnapshot) -> Result<Vec<Action>, SnapshotError> {
        if self.ui.exporting {
            return Err(SnapshotError::InvalidScene(SceneError::Busy));
        }
        let (scene, product) = snapshot.into_scene()?;
        self.scene = scene;
        self.product = product;
        self.input = InputState::Idle;
        Ok(vec![
            Action::SettingsChanged(self.scene.settings.clone()),
            Action::SelectionChanged(None),
            Action::RenderNeeded,
        ])
    }
}

fn round_zoom(zoom: f64) -> f64 {
    (zoom * 10.0).round() / 10.0
}

// =============================================================
// Engine
// =============================================================

/// An export running off the event loop.
pub enum PendingExport {
    Running(JoinHandle<ExportReport>),
    Ready(ExportReport),
}

impl PendingExport {
    /// Wait for the report. A crashed export task yields a failed report.
    pub async fn wait(self) -> ExportReport {
        match self {
            Self::Ready(report) => report,
            Self::Running(task) => match task.await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = %e, "export task failed");
                    ExportReport::failed(ExportError::TaskFailed(e.to_string()))
                }
            },
        }
    }
}

/// The full studio engine. Wraps `EngineCore` and owns the rasterizer and the
/// auto-rotate timer.
pub struct Engine {
    pub core: EngineCore,
    renderer: Arc<dyn OffscreenRenderer>,
    timer: AutoRotateTimer,
    ticks: mpsc::Receiver<()>,
    export_scale: f32,
    max_upload_bytes: usize,
}

impl Engine {
    /// Create an engine for a base product.
    #[must_use]
    pub fn new(product: ProductConfig, renderer: Arc<dyn OffscreenRenderer>) -> Self {
        let (timer, ticks) = AutoRotateTimer::new(Duration::from_millis(AUTO_ROTATE_INTERVAL_MS));
        Self {
            core: EngineCore::new(product),
            renderer,
            timer,
            ticks,
            export_scale: EXPORT_SCALE,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Override the export supersampling factor and the upload size limit.
    #[must_use]
    pub fn with_limits(mut self, export_scale: f32, max_upload_bytes: usize) -> Self {
        self.export_scale = export_scale;
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    // --- Delegated input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.core.on_pointer_cancel()
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Auto-rotate ---

    pub fn set_view(&mut self, view: ViewMode) -> Vec<Action> {
        let actions = self.core.set_view(view);
        self.sync_timer();
        actions
    }

    pub fn set_auto_rotate(&mut self, on: bool) {
        self.core.set_auto_rotate(on);
        self.sync_timer();
    }

    /// Start or stop the timer to match the core's auto-rotate state.
    pub fn sync_timer(&mut self) {
        let active = self.core.auto_rotate_active();
        self.timer.sync(active);
        if !active {
            // Ticks already queued belong to the cancelled run.
            while self.ticks.try_recv().is_ok() {}
        }
    }

    #[must_use]
    pub fn auto_rotate_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Wait for the next auto-rotate tick and apply it.
    ///
    /// Pending forever while auto-rotate is inactive; meant for a
    /// `tokio::select!` arm next to the host's input stream.
    pub async fn next_tick(&mut self) -> Vec<Action> {
        loop {
            if self.ticks.recv().await.is_none() {
                return Vec::new();
            }
            let actions = self.core.on_auto_rotate_tick();
            if !actions.is_empty() {
                return actions;
            }
        }
    }

    // --- Export ---

    /// Freeze edits and start capturing on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Busy` if an export is already in flight.
    pub fn start_export(&mut self) -> Result<PendingExport, SceneError> {
        let (scene, product) = self.core.begin_export()?;
        let renderer = Arc::clone(&self.renderer);
        let scale = self.export_scale;
        let run = move || export::export_design(&scene, &product, renderer.as_ref(), scale);

        Ok(match tokio::runtime::Handle::try_current() {
            Ok(handle) => PendingExport::Running(handle.spawn_blocking(run)),
            Err(_) => PendingExport::Ready(run()),
        })
    }

    /// Unfreeze edits after a [`PendingExport`] settled.
    pub fn finish_export(&mut self, report: &ExportReport) -> Vec<Action> {
        self.core.finish_export(report)
    }

    /// Export and unfreeze in one step.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Busy` if an export is already in flight.
    pub async fn export(&mut self) -> Result<(ExportReport, Vec<Action>), SceneError> {
        let report = self.start_export()?.wait().await;
        let actions = self.finish_export(&report);
        Ok((report, actions))
    }

    // --- Snapshots ---

    /// Replace the design with a snapshot, then start or stop the auto-rotate
    /// timer to match the restored view.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScene` if the snapshot breaks a scene invariant or an
    /// export is in flight; nothing changes in that case.
    pub fn load_snapshot(&mut self, snapshot: DesignSnapshot) -> Result<Vec<Action>, SnapshotError> {
        let actions = self.core.load_snapshot(snapshot)?;
        self.sync_timer();
        Ok(actions)
    }

    // --- Upload ---

    /// Validate and decode uploaded bytes off the event loop, then add the
    /// image. Rejections leave the scene unchanged and yield a notice.
    pub async fn upload_image(&mut self, bytes: Vec<u8>) -> Vec<Action> {
        if let Some(busy) = self.core.busy() {
            return busy;
        }
        let max = self.max_upload_bytes;
        let decoded = match tokio::runtime::Handle::try_current() {
            Ok(handle) => match handle.spawn_blocking(move || upload::decode_upload(&bytes, max)).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "upload task failed");
                    return vec![Action::Notice(Notice::new("E_UPLOAD_TASK", e.to_string()))];
                }
            },
            Err(_) => upload::decode_upload(&bytes, max),
        };
        match decoded {
            Ok(image) => self.core.add_image(&image),
            Err(e) => notice(&e),
        }
    }

    /// Live editor composite, chrome included.
    #[must_use]
    pub fn preview(&self) -> Composite {
        self.core.preview()
    }
}
