//! Viewport model: the single source of truth for what part of which page is visible.
//!
//! `Viewport` is a plain value (page index, render-target size, pan, scale).
//! `ViewportModel` owns the current viewport together with the facts needed to
//! validate it (the page geometry and the document's page count) and exposes
//! clamped mutators. Every mutator reports whether the viewport actually
//! changed so callers can skip redundant save/camera-sync cycles.
//!
//! INVARIANTS
//! ==========
//! - `scale >= MIN_SCALE`.
//! - `0 <= pan_x <= natural_width * (1 - 1/scale)`, likewise for `pan_y`.
//! - Without page geometry, pan and scale are frozen: no clamping is possible.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::Serialize;
use tracing::debug;

use crate::consts::MIN_SCALE;
use crate::geometry::{PageGeometry, Point, Size};

/// Page index, render-target size, pan offset and zoom scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub page_index: usize,
    pub render_width: f64,
    pub render_height: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { page_index: 0, render_width: 0.0, render_height: 0.0, pan_x: 0.0, pan_y: 0.0, scale: MIN_SCALE }
    }
}

impl Viewport {
    #[must_use]
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    #[must_use]
    pub fn render_size(&self) -> Size {
        Size::new(self.render_width, self.render_height)
    }

    /// Map an element-local offset to page-document coordinates.
    #[must_use]
    pub fn local_to_document(&self, local: Point) -> Point {
        Point::new(self.pan_x + local.x / self.scale, self.pan_y + local.y / self.scale)
    }

    /// Map a page-document point to element-local coordinates.
    #[must_use]
    pub fn document_to_local(&self, document: Point) -> Point {
        Point::new((document.x - self.pan_x) * self.scale, (document.y - self.pan_y) * self.scale)
    }
}

/// Clamp `pan` into the valid range for `scale` on a page of `geometry`.
#[must_use]
pub fn clamp_pan(pan: Point, scale: f64, geometry: &PageGeometry) -> Point {
    let max = geometry.max_pan(scale);
    Point::new(pan.x.clamp(0.0, max.x), pan.y.clamp(0.0, max.y))
}

/// Clamp a requested scale to the floor.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    scale.max(MIN_SCALE)
}

/// Owner of the current [`Viewport`] and the document facts that bound it.
#[derive(Debug, Clone, Default)]
pub struct ViewportModel {
    viewport: Viewport,
    geometry: Option<PageGeometry>,
    page_count: Option<usize>,
}

impl ViewportModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        self.viewport.page_index
    }

    /// Number of pages in the loaded document, or `None` while it is loading.
    #[must_use]
    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    #[must_use]
    pub fn geometry(&self) -> Option<PageGeometry> {
        self.geometry
    }

    #[must_use]
    pub fn render_size(&self) -> Size {
        self.viewport.render_size()
    }

    #[must_use]
    pub fn pan(&self) -> Point {
        self.viewport.pan()
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    // --- Document facts ---

    /// Record the page count of a freshly loaded document (`None` on failure).
    ///
    /// A loaded document pulls the current page index back into range.
    /// Returns `true` when the page index moved.
    pub fn set_page_count(&mut self, page_count: Option<usize>) -> bool {
        self.page_count = page_count;
        let Some(count) = page_count else {
            return false;
        };
        let last = count.saturating_sub(1);
        if self.viewport.page_index > last {
            self.viewport.page_index = last;
            return true;
        }
        false
    }

    /// Replace the page geometry (`None` while loading or after a failure).
    ///
    /// New geometry re-clamps the pan. Absent geometry leaves the viewport
    /// at its last-known-good state. Returns `true` when the viewport changed.
    pub fn set_geometry(&mut self, geometry: Option<PageGeometry>) -> bool {
        self.geometry = geometry;
        let Some(geometry) = geometry else {
            return false;
        };
        let next = Viewport { scale: clamp_scale(self.viewport.scale), ..self.viewport };
        let pan = clamp_pan(next.pan(), next.scale, &geometry);
        self.commit(Viewport { pan_x: pan.x, pan_y: pan.y, ..next })
    }

    // --- Mutators ---

    /// Replace the render-target size; never changes the scale.
    pub fn set_render_size(&mut self, size: Size) -> bool {
        if !(size.width.is_finite() && size.height.is_finite()) {
            return false;
        }
        let mut next = Viewport { render_width: size.width.max(0.0), render_height: size.height.max(0.0), ..self.viewport };
        if let Some(geometry) = &self.geometry {
            let pan = clamp_pan(next.pan(), next.scale, geometry);
            next.pan_x = pan.x;
            next.pan_y = pan.y;
        }
        self.commit(next)
    }

    /// Move the pan offset, clamped to the page. No-op without geometry.
    pub fn set_pan(&mut self, pan: Point) -> bool {
        self.set_view(pan, self.viewport.scale)
    }

    /// Change the scale (floored at 1), re-clamping the current pan.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.set_view(self.viewport.pan(), scale)
    }

    /// Set pan and scale together as one viewport update.
    pub fn set_view(&mut self, pan: Point, scale: f64) -> bool {
        let Some(geometry) = self.geometry else {
            debug!("no page geometry yet; deferring viewport update");
            return false;
        };
        if !(pan.x.is_finite() && pan.y.is_finite() && scale.is_finite()) {
            return false;
        }
        let scale = clamp_scale(scale);
        let pan = clamp_pan(pan, scale, &geometry);
        self.commit(Viewport { pan_x: pan.x, pan_y: pan.y, scale, ..self.viewport })
    }

    /// Set every render option at once: size, pan and scale.
    pub fn set_render_options(&mut self, size: Size, pan: Point, scale: f64) -> bool {
        let Some(geometry) = self.geometry else {
            return false;
        };
        let finite = [size.width, size.height, pan.x, pan.y, scale].iter().all(|v| v.is_finite());
        if !finite {
            return false;
        }
        let scale = clamp_scale(scale);
        let pan = clamp_pan(pan, scale, &geometry);
        self.commit(Viewport {
            page_index: self.viewport.page_index,
            render_width: size.width.max(0.0),
            render_height: size.height.max(0.0),
            pan_x: pan.x,
            pan_y: pan.y,
            scale,
        })
    }

    /// Navigate to `index`. Out-of-range indices, or an unloaded document, leave the page unchanged.
    pub fn set_page_index(&mut self, index: i64) -> bool {
        let Some(count) = self.page_count else {
            debug!(index, "no document loaded; ignoring page change");
            return false;
        };
        let Ok(index) = usize::try_from(index) else {
            return false;
        };
        if index >= count {
            return false;
        }
        self.commit(Viewport { page_index: index, ..self.viewport })
    }

    /// Step back one page; no-op on the first page.
    pub fn move_to_previous_page(&mut self) -> bool {
        match self.viewport.page_index.checked_sub(1) {
            Some(index) => self.set_page_index(to_index(index)),
            None => false,
        }
    }

    /// Step forward one page; no-op on the last page.
    pub fn move_to_next_page(&mut self) -> bool {
        self.set_page_index(to_index(self.viewport.page_index.saturating_add(1)))
    }

    fn commit(&mut self, next: Viewport) -> bool {
        if next == self.viewport {
            debug!("ignoring redundant viewport update");
            return false;
        }
        self.viewport = next;
        true
    }
}

fn to_index(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
