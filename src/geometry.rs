//! Plane geometry shared by the viewport, gesture, and camera code.
//!
//! Three coordinate spaces meet here:
//!
//! - **element-local** pixels: offsets reported by the host for pointer and
//!   wheel events, relative to the render target's top-left corner;
//! - **page-document** pixels: the natural, scale-1 pixel space of the
//!   rendered page, in which pan offsets live;
//! - **canvas-native** coordinates: the space each annotation canvas draws in,
//!   bridged by [`crate::camera_sync`].

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point (or a 2D delta) in any of the painter's coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero, negative, or not a number.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("page size must be finite and positive, got {width} x {height}")]
pub struct InvalidPageGeometry {
    pub width: f64,
    pub height: f64,
}

/// Wire shape of [`PageGeometry`]; every decode goes through validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageGeometry {
    natural_width: f64,
    natural_height: f64,
}

/// Intrinsic pixel size of a rendered page at scale 1.
///
/// Produced by the PDF renderer when a page finishes loading. Replaced
/// wholesale on every page change or reload. Both sides are always finite
/// and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPageGeometry")]
pub struct PageGeometry {
    natural_width: f64,
    natural_height: f64,
}

impl TryFrom<RawPageGeometry> for PageGeometry {
    type Error = InvalidPageGeometry;

    fn try_from(raw: RawPageGeometry) -> Result<Self, Self::Error> {
        Self::new(raw.natural_width, raw.natural_height)
            .ok_or(InvalidPageGeometry { width: raw.natural_width, height: raw.natural_height })
    }
}

impl PageGeometry {
    /// Build a geometry, rejecting non-positive or non-finite dimensions.
    #[must_use]
    pub fn new(natural_width: f64, natural_height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(natural_width) && valid(natural_height)).then_some(Self { natural_width, natural_height })
    }

    #[must_use]
    pub fn natural_width(&self) -> f64 {
        self.natural_width
    }

    #[must_use]
    pub fn natural_height(&self) -> f64 {
        self.natural_height
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.natural_width / self.natural_height
    }

    /// Largest pan offset that keeps the visible window inside the page at `scale`.
    #[must_use]
    pub fn max_pan(&self, scale: f64) -> Point {
        let visible = 1.0 - 1.0 / scale;
        Point {
            x: (self.natural_width * visible).max(0.0),
            y: (self.natural_height * visible).max(0.0),
        }
    }

    /// Clamp a page-document point onto the page, snapping to whole pixels.
    #[must_use]
    pub fn clamp_document_point(&self, point: Point) -> Point {
        Point {
            x: point.x.round().clamp(0.0, self.natural_width.floor()),
            y: point.y.round().clamp(0.0, self.natural_height.floor()),
        }
    }

    /// The largest box with this page's aspect ratio that fits in `container`.
    ///
    /// A page relatively wider than the container is bound by the container
    /// width; otherwise by its height. Returns `None` for an empty container.
    #[must_use]
    pub fn fit_within(&self, container: Size) -> Option<Size> {
        if container.is_empty() {
            return None;
        }
        let page_ratio = self.aspect_ratio();
        let container_ratio = container.width / container.height;
        let fitted = if page_ratio > container_ratio {
            Size::new(container.width, container.width / page_ratio)
        } else {
            Size::new(container.height * page_ratio, container.height)
        };
        Some(fitted)
    }
}
