//! PDF painter: a paginated PDF viewer with per-page annotation layers.
//!
//! One viewport (page, render size, pan, scale) drives any number of
//! annotation canvases laid over the rendered page. Every canvas gets the same
//! camera, and each canvas's drawing is saved per page and swapped in and out
//! as the reader navigates. The PDF renderer and the drawing canvases live in
//! the host; this crate owns the viewport math, the gesture handling, and the
//! persistence cycle, and tells the host what to do through
//! [`painter::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`painter`] | Top-level [`painter::PainterController`] facade and its actions |
//! | [`viewport`] | Viewport value and the clamping [`viewport::ViewportModel`] |
//! | [`gesture`] | Wheel zoom, drag panning, and arrow-key paging |
//! | [`input`] | Drag modes and raw input event types |
//! | [`geometry`] | Points, sizes, page geometry and aspect fitting |
//! | [`snapshot`] | Per-instance, per-page annotation persistence |
//! | [`camera_sync`] | Viewport to canvas camera conversion |
//! | [`registry`] | Live annotation canvases by instance id |
//! | [`canvas`] | The annotation-canvas collaborator trait |
//! | [`storage`] | The key/value storage collaborator trait and an in-memory store |
//! | [`config`] | Host options and their validation |
//! | [`consts`] | Shared numeric constants (zoom step, minimum scale, rounding) |
//! | `web` | Browser bindings, behind the `web` feature |

pub mod camera_sync;
pub mod canvas;
pub mod config;
pub mod consts;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod painter;
pub mod registry;
pub mod snapshot;
pub mod storage;
pub mod viewport;

#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod testing;

pub use canvas::{AnnotationCanvas, CameraOptions, CanvasCamera, CanvasError};
pub use config::{ConfigError, PainterConfig};
pub use geometry::{PageGeometry, Point, Size};
pub use input::{DragMode, InputEvent};
pub use painter::{Action, PainterController};
pub use registry::InstanceOptions;
pub use snapshot::PersistedSnapshot;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use viewport::Viewport;
