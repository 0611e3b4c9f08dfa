//! Input model: drag modes, pointer buttons, and the raw events the host forwards.
//!
//! The painter never touches the DOM. The host measures whatever it needs
//! (element offsets, bounding rectangles, held buttons) and hands the numbers
//! over as the plain event structs below, which keeps every handler testable
//! with synthetic input.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Which interaction owns pointer gestures. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    /// Neither panning nor drawing; wheel zoom and keyboard paging still work.
    #[default]
    Default,
    /// Pointer drags pan the viewport; annotation canvases ignore the pointer.
    Move,
    /// Annotation canvases receive the pointer; viewport panning is off.
    Draw,
}

impl DragMode {
    /// Whether pointer drags pan the viewport.
    #[must_use]
    pub fn pans_viewport(self) -> bool {
        self == Self::Move
    }

    /// Whether annotation canvases accept pointer input.
    #[must_use]
    pub fn canvases_interactive(self) -> bool {
        self == Self::Draw
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown drag-mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown drag mode: {0}")]
pub struct UnknownDragMode(pub String);

impl FromStr for DragMode {
    type Err = UnknownDragMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "move" => Ok(Self::Move),
            "draw" => Ok(Self::Draw),
            other => Err(UnknownDragMode(other.to_owned())),
        }
    }
}

/// Bitmask of held pointer buttons, as reported by `MouseEvent.buttons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);
    pub const SECONDARY: Self = Self(2);
    pub const MIDDLE: Self = Self(4);

    /// True only when the primary button is the sole button held.
    #[must_use]
    pub fn primary_only(self) -> bool {
        self == Self::PRIMARY
    }
}

/// A wheel event over the render target.
///
/// `offset` is relative to the element that received the event, which may be
/// a child of the render target; `target_origin` and `container_origin` are
/// the client-space top-left corners of that element and of the render target.
#[derive(Debug, Clone, Copy)]
pub struct WheelInput {
    pub offset: Point,
    pub target_origin: Point,
    pub container_origin: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
}

impl WheelInput {
    /// Wheel event whose target is the render target itself.
    #[must_use]
    pub fn at(offset: Point, delta_y: f64) -> Self {
        Self {
            offset,
            target_origin: Point::default(),
            container_origin: Point::default(),
            delta_x: 0.0,
            delta_y,
            delta_z: 0.0,
        }
    }

    /// Pointer position within the render target, in whole element-local pixels.
    #[must_use]
    pub fn local_offset(&self) -> Point {
        Point::new(
            (self.offset.x + self.target_origin.x - self.container_origin.x).round(),
            (self.offset.y + self.target_origin.y - self.container_origin.y).round(),
        )
    }

    /// Zoom direction: `-1` when the combined delta scrolls down/away, `+1` otherwise.
    #[must_use]
    pub fn zoom_direction(&self) -> f64 {
        if self.delta_x + self.delta_y + self.delta_z > 0.0 { -1.0 } else { 1.0 }
    }
}

/// A pointer move over the render target, in client coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub position: Point,
    pub buttons: Buttons,
}

/// A keyboard key as reported by `KeyboardEvent.key` (e.g. `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Every input the painter reacts to, for hosts that funnel events through one entry point.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Wheel(WheelInput),
    PointerMove(PointerInput),
    PointerUp,
    KeyDown(Key),
    /// The observed container box changed size.
    Resize { width: f64, height: f64 },
}
