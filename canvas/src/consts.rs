//! Shared numeric constants for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Default width of the design surface in canvas units.
pub const DEFAULT_CANVAS_WIDTH: f64 = 600.0;

/// Default height of the design surface in canvas units.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 700.0;

/// Grid pitch used for snapping and for the editor grid overlay.
pub const GRID_SIZE: f64 = 10.0;

/// Smallest width or height an element may be resized to.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Position offset applied to a duplicated element.
pub const DUPLICATE_OFFSET: f64 = 20.0;

// ── Zoom ────────────────────────────────────────────────────────

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Side length of a drawn resize handle, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;

// ── Mockup ──────────────────────────────────────────────────────

/// Fixed downward tilt of the mockup in the 3D view, in degrees.
pub const THREE_D_PITCH_DEG: f64 = 15.0;

/// Yaw advance per auto-rotate tick, in degrees.
pub const AUTO_ROTATE_STEP_DEG: f64 = 1.0;

/// Auto-rotate tick period in milliseconds.
pub const AUTO_ROTATE_INTERVAL_MS: u64 = 50;

// ── Export ──────────────────────────────────────────────────────

/// Supersampling factor applied to the composite for print output.
pub const EXPORT_SCALE: f32 = 3.0;

/// Largest page side a PDF viewer is required to support (user units).
pub const PDF_MAX_PAGE_SIDE: u32 = 14_400;

// ── Upload / pricing ────────────────────────────────────────────

/// Largest accepted image upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Flat fee charged once a design carries at least one element.
pub const CUSTOMIZATION_FEE: f64 = 10.0;
