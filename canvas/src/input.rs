//! Input model: modifier keys, mouse buttons, keys, and the gesture state machine.
//!
//! `InputState` is the single active gesture tracked between pointer-down and
//! pointer-up. It is one value owned by the engine, so at most one gesture can
//! exist at a time: starting a drag while resizing is unrepresentable.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::ElementId;
use crate::geom::{Geometry, ResizeHandle};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Persistent UI state that is not part of the saved design.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The user wants the 3D mockup to spin.
    pub auto_rotate: bool,
    /// An export is capturing the scene; edits are refused until it settles.
    pub exporting: bool,
}

/// The active gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving an element.
    Dragging {
        id: ElementId,
        /// Pointer minus element origin at grab time, in canvas units.
        offset: Point,
    },
    /// Resizing an element by one of its handles.
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        /// Element frame when the gesture started.
        start_geometry: Geometry,
        /// Canvas-space pointer position when the gesture started.
        start_pointer: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Element targeted by the active gesture.
    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }
}
