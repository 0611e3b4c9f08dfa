//! Gesture translation: wheel, pointer and keyboard input to viewport intents.
//!
//! The controller never mutates the viewport itself. Each handler reads the
//! current viewport (and page geometry) and returns a [`Gesture`] describing
//! the next viewport; the painter applies it through the clamping model and
//! runs persistence and camera sync off the resulting change notification.
//! The only state kept here is the drag baseline: the last pointer position
//! seen while the primary button was held.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::consts::SCALE_DECIMALS;
use crate::geometry::{PageGeometry, Point};
use crate::input::{DragMode, Key, PointerInput, WheelInput};
use crate::viewport::{Viewport, clamp_scale};

/// Direction of a keyboard page step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Previous,
    Next,
}

/// The viewport change a gesture asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Set pan and scale together (zoom about a point).
    View { pan: Point, scale: f64 },
    /// Move the pan offset, keeping the scale.
    Pan(Point),
    /// Turn the page.
    Page(PageStep),
}

/// Round a scale to the wheel-zoom precision.
#[must_use]
pub fn round_scale(scale: f64) -> f64 {
    let factor = 10f64.powi(SCALE_DECIMALS);
    (scale * factor).round() / factor
}

/// Compute the view that keeps the document point under `offset` fixed while
/// the scale changes by `scale_delta` (a fraction, e.g. `0.2` or `-0.2`).
///
/// The document point is snapped to whole page pixels and clamped to the page
/// before solving for the new pan. Returns `None` without page geometry.
#[must_use]
pub fn zoom_about(viewport: &Viewport, geometry: Option<&PageGeometry>, offset: Point, scale_delta: f64) -> Option<Gesture> {
    let geometry = geometry?;
    let scale = clamp_scale(round_scale(viewport.scale * (1.0 + scale_delta)));
    let anchor = geometry.clamp_document_point(viewport.local_to_document(offset));
    let pan = Point::new(anchor.x - offset.x / scale, anchor.y - offset.y / scale);
    Some(Gesture::View { pan, scale })
}

/// Translates raw input into [`Gesture`]s.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    baseline: Option<Point>,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded pointer position of the drag in progress, if any.
    #[must_use]
    pub fn baseline(&self) -> Option<Point> {
        self.baseline
    }

    /// Zoom about the pointer by one `zoom_step` notch in the wheel's direction.
    #[must_use]
    pub fn on_wheel(&self, wheel: &WheelInput, viewport: &Viewport, geometry: Option<&PageGeometry>, zoom_step: f64) -> Option<Gesture> {
        zoom_about(viewport, geometry, wheel.local_offset(), wheel.zoom_direction() * zoom_step)
    }

    /// Pan while dragging with the primary button in `move` mode.
    ///
    /// The first sample of a drag only records the baseline. Releasing the
    /// button (or leaving `move` mode) drops it.
    pub fn on_pointer_move(&mut self, pointer: &PointerInput, mode: DragMode, viewport: &Viewport) -> Option<Gesture> {
        if !mode.pans_viewport() || !pointer.buttons.primary_only() {
            self.baseline = None;
            return None;
        }
        let previous = self.baseline.replace(pointer.position)?;
        let delta = Point::new(pointer.position.x - previous.x, pointer.position.y - previous.y);
        if delta == Point::default() {
            return None;
        }
        Some(Gesture::Pan(Point::new(
            viewport.pan_x - delta.x / viewport.scale,
            viewport.pan_y - delta.y / viewport.scale,
        )))
    }

    /// The pointer button was released: the next move starts a fresh drag.
    pub fn on_pointer_up(&mut self) {
        self.baseline = None;
    }

    /// `ArrowLeft` / `ArrowRight` turn the page; every other key is ignored.
    #[must_use]
    pub fn on_key_down(&self, key: &Key) -> Option<Gesture> {
        match key.0.as_str() {
            "ArrowLeft" => Some(Gesture::Page(PageStep::Previous)),
            "ArrowRight" => Some(Gesture::Page(PageStep::Next)),
            _ => None,
        }
    }
}
