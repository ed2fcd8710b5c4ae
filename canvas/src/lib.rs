//! Design canvas engine for the product customization studio.
//!
//! The crate owns the whole lifecycle of a garment design: translating raw
//! pointer and keyboard input into scene mutations, snapping and clamping
//! element frames to the print area, composing the front/back/3D mockup, and
//! capturing the finished design as a PNG and a single-page PDF. The host UI
//! wires its events to [`engine::Engine`] and applies the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Scene store, design elements and canvas settings |
//! | [`geom`] | Frames, snapping, clamping, resize and rotation math |
//! | [`camera`] | Zoom and screen/canvas coordinate conversion |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against elements and resize handles |
//! | [`render`] | Display-list composition and the offscreen renderer seam |
//! | [`raster`] | tiny-skia implementation of the offscreen renderer |
//! | [`fonts`] | System font lookup for text rasterization |
//! | [`color`] | CSS color parsing |
//! | [`export`] | PNG capture and the export report |
//! | [`pdf`] | Single-page PDF wrapping of a captured bitmap |
//! | [`upload`] | Image upload validation and data URI handling |
//! | [`snapshot`] | Serializable design snapshots |
//! | [`product`] | Base product configuration and pricing |
//! | [`timer`] | Auto-rotate tick source |
//! | [`error`] | Error codes and user-facing notices |
//! | [`consts`] | Shared numeric constants (grid, zoom limits, export scale) |

pub mod camera;
pub mod color;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod export;
pub mod fonts;
pub mod geom;
pub mod hit;
pub mod input;
pub mod pdf;
pub mod product;
pub mod raster;
pub mod render;
pub mod snapshot;
pub mod timer;
pub mod upload;
