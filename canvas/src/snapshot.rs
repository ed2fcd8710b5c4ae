//! Design snapshots: the committed, serializable form of a scene.
//!
//! A snapshot carries every element (insertion order preserved), the canvas
//! settings and the product it was designed for. Selection and gesture state
//! are editor-only and are not persisted. Restoring re-validates every scene
//! invariant, so a hand-edited snapshot with duplicate ids or empty frames is
//! rejected rather than loaded.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::doc::{CanvasSettings, DesignElement, Scene, SceneError};
use crate::error::ErrorCode;
use crate::product::ProductConfig;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot violates scene invariants: {0}")]
    InvalidScene(#[from] SceneError),
}

impl ErrorCode for SnapshotError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "E_SNAPSHOT_JSON",
            Self::InvalidScene(e) => e.error_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    pub elements: Vec<DesignElement>,
    pub canvas_settings: CanvasSettings,
    pub product_config_ref: ProductConfig,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl DesignSnapshot {
    /// Capture the scene as it is right now.
    #[must_use]
    pub fn capture(scene: &Scene, product: &ProductConfig) -> Self {
        Self {
            elements: scene.elements().to_vec(),
            canvas_settings: scene.settings.clone(),
            product_config_ref: product.clone(),
            timestamp: now_ms(),
        }
    }

    /// Rebuild a scene (with nothing selected) and its product.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScene` if any element breaks a scene invariant.
    pub fn into_scene(self) -> Result<(Scene, ProductConfig), SnapshotError> {
        let scene = Scene::from_parts(self.elements, self.canvas_settings)?;
        Ok((scene, self.product_config_ref))
    }

    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Returns `Json` for malformed input.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
