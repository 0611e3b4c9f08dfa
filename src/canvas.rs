//! The annotation-canvas collaborator.
//!
//! The drawing canvas is an external library; the painter only needs the
//! narrow surface below. Snapshots cross this seam as JSON values whose
//! structure belongs to the canvas.

use serde::Serialize;
use serde_json::Value;

/// A camera in the canvas's own page coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CanvasCamera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

/// Options passed along with a camera update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CameraOptions {
    /// Apply even if the canvas has its camera locked or is animating.
    pub force: bool,
}

impl CameraOptions {
    #[must_use]
    pub fn forced() -> Self {
        Self { force: true }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas rejected snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("canvas is detached")]
    Detached,
}

/// A live annotation canvas registered with the painter.
pub trait AnnotationCanvas {
    /// Serialize the canvas's current drawing state.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Detached`] if the canvas can no longer be read.
    fn get_snapshot(&self) -> Result<Value, CanvasError>;

    /// Replace the drawing state with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidSnapshot`] if the payload is structurally invalid.
    fn load_snapshot(&mut self, snapshot: &Value) -> Result<(), CanvasError>;

    fn set_camera(&mut self, camera: CanvasCamera, options: CameraOptions);

    /// Stop the canvas's own gestures from moving its camera.
    fn lock_camera(&mut self);

    fn clear_selection(&mut self);

    /// Toggle whether the canvas accepts pointer input (read-only otherwise).
    fn set_interactive(&mut self, _interactive: bool) {}
}
