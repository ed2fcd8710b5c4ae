//! Scene model: design elements, their payloads, and the scene aggregate.
//!
//! This module defines what is on the design surface (`DesignElement`,
//! `ElementPayload`), a sparse-update type for incremental edits
//! (`PartialElement`), the global surface settings (`CanvasSettings`), and the
//! aggregate that owns all live elements (`Scene`).
//!
//! Mutations arrive from the interaction engine and from toolbox actions. The
//! renderer reads `Scene::sorted_elements` to determine paint order.
//!
//! `Scene` keeps elements in insertion order; paint order is `(layer,
//! insertion index)`. Element ids are unique for the scene's lifetime and every
//! mutation re-checks that invariant.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DUPLICATE_OFFSET};
use crate::error::ErrorCode;
use crate::geom::Geometry;

/// Unique identifier for a design element.
pub type ElementId = Uuid;

// =============================================================
// Errors
// =============================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("element not found: {0}")]
    NotFound(ElementId),
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("invalid element size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("payload kind {got:?} does not match element kind {expected:?}")]
    KindMismatch { expected: ElementKind, got: ElementKind },
    #[error("an export is in progress; the design is read-only")]
    Busy,
}

impl ErrorCode for SceneError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
            Self::InvalidSize { .. } => "E_INVALID_SIZE",
            Self::KindMismatch { .. } => "E_KIND_MISMATCH",
            Self::Busy => "E_BUSY",
        }
    }
}

// =============================================================
// Element payloads
// =============================================================

/// The kind of a design element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Shape,
}

/// Outline drawn around text glyphs or shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// CSS color string.
    pub color: String,
    /// Line width in canvas units.
    pub width: f64,
}

/// Drop shadow drawn beneath text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: String,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Blur radius in canvas units. Rasterizers without blur ignore it.
    #[serde(default)]
    pub blur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPayload {
    pub content: String,
    pub font_family: String,
    /// Font size in canvas units.
    pub font_size: f64,
    /// CSS weight (400 = normal, 700 = bold).
    pub font_weight: u16,
    pub fill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

impl Default for TextPayload {
    fn default() -> Self {
        Self {
            content: "Your Text".into(),
            font_family: "Arial".into(),
            font_size: 24.0,
            font_weight: 400,
            fill: "#000000".into(),
            shadow: None,
            stroke: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Embedded raster as a `data:` URI.
    pub src: String,
}

/// Vector shape outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Circle,
    Rectangle,
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePayload {
    pub shape: ShapeType,
    pub fill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

impl Default for ShapePayload {
    fn default() -> Self {
        Self { shape: ShapeType::Rectangle, fill: "#3B82F6".into(), stroke: None }
    }
}

/// Kind-specific element content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementPayload {
    Text(TextPayload),
    Image(ImagePayload),
    Shape(ShapePayload),
}

impl ElementPayload {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
            Self::Shape(_) => ElementKind::Shape,
        }
    }

    /// Default frame for a freshly added element of this payload.
    #[must_use]
    pub fn default_geometry(&self) -> Geometry {
        match self {
            Self::Text(_) => Geometry::new(100.0, 100.0, 200.0, 50.0),
            Self::Image(_) => Geometry::new(100.0, 100.0, 150.0, 150.0),
            Self::Shape(_) => Geometry::new(100.0, 100.0, 100.0, 100.0),
        }
    }
}

// =============================================================
// DesignElement
// =============================================================

/// One placeable unit on the design surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    pub id: ElementId,
    pub geometry: Geometry,
    /// Paint order; higher values paint on top.
    pub layer: i64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Locked elements are painted but never hit, dragged or resized.
    #[serde(default)]
    pub locked: bool,
    pub payload: ElementPayload,
}

impl DesignElement {
    /// Build an element with a fresh id, fully opaque, unlocked, on layer 0.
    #[must_use]
    pub fn new(payload: ElementPayload, geometry: Geometry) -> Self {
        Self { id: Uuid::new_v4(), geometry, layer: 0, opacity: 1.0, locked: false, payload }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.payload.kind()
    }
}

/// Sparse update for a design element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Replacement payload; must be the same kind as the element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ElementPayload>,
}

impl PartialElement {
    /// A partial that sets every geometry field.
    #[must_use]
    pub fn geometry(g: Geometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            width: Some(g.width),
            height: Some(g.height),
            rotation: Some(g.rotation),
            ..Self::default()
        }
    }
}

// =============================================================
// Canvas settings
// =============================================================

/// Which face of the product mockup is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    Front,
    Back,
    ThreeD,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub zoom: f64,
    pub active_view: ViewMode,
    /// Mockup yaw in degrees for the 3D view.
    #[serde(rename = "rotation3D")]
    pub rotation_3d: f64,
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,
}

fn default_canvas_width() -> f64 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> f64 {
    DEFAULT_CANVAS_HEIGHT
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            show_grid: false,
            snap_to_grid: false,
            zoom: 1.0,
            active_view: ViewMode::Front,
            rotation_3d: 0.0,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Direction for [`Scene::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reorder {
    ToFront,
    ToBack,
}

// =============================================================
// Scene
// =============================================================

/// All design elements plus surface settings for one customization session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: Vec<DesignElement>,
    selected_id: Option<ElementId>,
    pub settings: CanvasSettings,
}

impl Scene {
    /// Create an empty scene with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene with the given settings.
    #[must_use]
    pub fn with_settings(settings: CanvasSettings) -> Self {
        Self { settings, ..Self::default() }
    }

    /// Rebuild a scene from stored elements, validating every invariant.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` or `InvalidSize` if an element breaks an invariant.
    pub fn from_parts(elements: Vec<DesignElement>, settings: CanvasSettings) -> Result<Self, SceneError> {
        let mut scene = Self::with_settings(settings);
        for element in elements {
            scene.insert(element)?;
        }
        Ok(scene)
    }

    /// Insert a fully-formed element, keeping its id and layer.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is taken, `InvalidSize` for a
    /// non-positive or non-finite size.
    pub fn insert(&mut self, element: DesignElement) -> Result<(), SceneError> {
        if self.contains(&element.id) {
            tracing::error!(id = %element.id, "rejected element with duplicate id");
            return Err(SceneError::DuplicateId(element.id));
        }
        check_size(element.geometry.width, element.geometry.height)?;
        self.elements.push(element);
        Ok(())
    }

    /// Add a new element on the top layer and return its id.
    ///
    /// `geometry` falls back to the payload's default frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSize` for a non-positive or non-finite size.
    pub fn add_element(&mut self, payload: ElementPayload, geometry: Option<Geometry>) -> Result<ElementId, SceneError> {
        let geometry = geometry.unwrap_or_else(|| payload.default_geometry());
        let mut element = DesignElement::new(payload, geometry);
        element.layer = self.next_layer();
        let id = element.id;
        self.insert(element)?;
        tracing::debug!(%id, "element added");
        Ok(id)
    }

    /// Apply a partial update.
    ///
    /// The update is validated before anything is written, so a rejected
    /// update leaves the element untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidSize`, or `KindMismatch`.
    pub fn update_element(&mut self, id: &ElementId, partial: &PartialElement) -> Result<(), SceneError> {
        let element = self.get_mut(id).ok_or(SceneError::NotFound(*id))?;

        let width = partial.width.unwrap_or(element.geometry.width);
        let height = partial.height.unwrap_or(element.geometry.height);
        check_size(width, height)?;
        if let Some(payload) = &partial.payload {
            if payload.kind() != element.kind() {
                return Err(SceneError::KindMismatch { expected: element.kind(), got: payload.kind() });
            }
        }

        if let Some(x) = partial.x {
            element.geometry.x = x;
        }
        if let Some(y) = partial.y {
            element.geometry.y = y;
        }
        element.geometry.width = width;
        element.geometry.height = height;
        if let Some(r) = partial.rotation {
            element.geometry.rotation = r;
        }
        if let Some(layer) = partial.layer {
            element.layer = layer;
        }
        if let Some(opacity) = partial.opacity {
            element.opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { element.opacity };
        }
        if let Some(locked) = partial.locked {
            element.locked = locked;
        }
        if let Some(payload) = &partial.payload {
            element.payload = payload.clone();
        }
        Ok(())
    }

    /// Replace an element's geometry wholesale.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidSize`.
    pub fn apply_transform(&mut self, id: &ElementId, geometry: Geometry) -> Result<(), SceneError> {
        check_size(geometry.width, geometry.height)?;
        let element = self.get_mut(id).ok_or(SceneError::NotFound(*id))?;
        element.geometry = geometry;
        Ok(())
    }

    /// Remove an element. Clears the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has this id.
    pub fn delete_element(&mut self, id: &ElementId) -> Result<DesignElement, SceneError> {
        let idx = self.index_of(id).ok_or(SceneError::NotFound(*id))?;
        if self.selected_id.as_ref() == Some(id) {
            self.selected_id = None;
        }
        Ok(self.elements.remove(idx))
    }

    /// Clone an element with a fresh id, offset, on top of every other layer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has this id.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Result<ElementId, SceneError> {
        let source = self.get(id).ok_or(SceneError::NotFound(*id))?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.geometry.x += DUPLICATE_OFFSET;
        copy.geometry.y += DUPLICATE_OFFSET;
        copy.layer = self.next_layer();
        let new_id = copy.id;
        self.insert(copy)?;
        Ok(new_id)
    }

    /// Move an element to the top or bottom of the paint order.
    ///
    /// `ToFront` sets `layer = max + 1`. `ToBack` puts the element on layer 0
    /// and compacts every other element onto layers `1..=n` in their existing
    /// paint order. Decrementing the others by one instead would tie the
    /// former layer-1 element with the moved one on layer 0.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has this id.
    pub fn reorder(&mut self, id: &ElementId, to: Reorder) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::NotFound(*id));
        }
        match to {
            Reorder::ToFront => {
                let layer = self.next_layer();
                if let Some(element) = self.get_mut(id) {
                    element.layer = layer;
                }
            }
            Reorder::ToBack => {
                let mut next = 1;
                for i in self.paint_order() {
                    let element = &mut self.elements[i];
                    if element.id == *id {
                        element.layer = 0;
                    } else {
                        element.layer = next;
                        next += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is not in the scene.
    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), SceneError> {
        if let Some(id) = id {
            if !self.contains(&id) {
                return Err(SceneError::NotFound(id));
            }
        }
        self.selected_id = id;
        Ok(())
    }

    // --- Queries ---

    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected_id
    }

    #[must_use]
    pub fn selected(&self) -> Option<&DesignElement> {
        self.selected_id.as_ref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&DesignElement> {
        self.elements.iter().find(|e| e.id == *id)
    }

    fn get_mut(&mut self, id: &ElementId) -> Option<&mut DesignElement> {
        self.elements.iter_mut().find(|e| e.id == *id)
    }

    fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    /// Elements in paint order: ascending layer, ties by insertion order.
    #[must_use]
    pub fn sorted_elements(&self) -> Vec<&DesignElement> {
        let mut sorted: Vec<&DesignElement> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.layer);
        sorted
    }

    /// Highest layer in use, if any.
    #[must_use]
    pub fn max_layer(&self) -> Option<i64> {
        self.elements.iter().map(|e| e.layer).max()
    }

    /// Layer above every element. Restored layers near `i64::MAX` are
    /// compacted onto `0..n` first.
    fn next_layer(&mut self) -> i64 {
        let Some(max) = self.max_layer() else {
            return 0;
        };
        if let Some(next) = max.checked_add(1) {
            return next;
        }
        tracing::warn!(max, "layer range exhausted; compacting layers");
        self.compact_layers();
        i64::try_from(self.elements.len()).unwrap_or(i64::MAX)
    }

    /// Renumber layers onto `0..n`, keeping paint order.
    fn compact_layers(&mut self) {
        for (layer, i) in (0_i64..).zip(self.paint_order()) {
            self.elements[i].layer = layer;
        }
    }

    /// Element indices in paint order.
    fn paint_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&i| self.elements[i].layer);
        order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn check_size(width: f64, height: f64) -> Result<(), SceneError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidSize { width, height })
    }
}
