//! Camera synchronization between the viewport and every annotation canvas.
//!
//! Each canvas is laid over the render target and treats that box as "the
//! page", while pan offsets live in natural page pixels. The correction
//! factor bridges the two: the mean of the horizontal and vertical ratios of
//! render size to natural size. The mean is exact only when the render box
//! keeps the page's aspect ratio, which the aspect-fit sizing guarantees.
//!
//! Pushes are always forced so canvases never lag or smooth behind the
//! viewport, and every canvas gets the same camera.

#[cfg(test)]
#[path = "camera_sync_test.rs"]
mod camera_sync_test;

use tracing::debug;

use crate::canvas::{CameraOptions, CanvasCamera};
use crate::geometry::PageGeometry;
use crate::registry::InstanceRegistry;
use crate::viewport::Viewport;

/// Ratio of render pixels to natural pixels on one axis, or 1 when unknown.
fn axis_ratio(render: f64, natural: Option<f64>) -> f64 {
    match natural {
        Some(natural) if natural > 0.0 => render / natural,
        _ => 1.0,
    }
}

/// Mean render-to-natural ratio over both axes.
#[must_use]
pub fn scale_correction(viewport: &Viewport, geometry: Option<&PageGeometry>) -> f64 {
    let scale_x = axis_ratio(viewport.render_width, geometry.map(PageGeometry::natural_width));
    let scale_y = axis_ratio(viewport.render_height, geometry.map(PageGeometry::natural_height));
    (scale_x + scale_y) / 2.0
}

/// The camera that pins canvas content to the page under `viewport`.
///
/// Before the render box is laid out the correction is zero; it is then taken as 1.
#[must_use]
pub fn camera_for(viewport: &Viewport, geometry: Option<&PageGeometry>) -> CanvasCamera {
    let correction = match scale_correction(viewport, geometry) {
        c if c > 0.0 && c.is_finite() => c,
        _ => 1.0,
    };
    CanvasCamera {
        x: -viewport.pan_x / correction,
        y: -viewport.pan_y / correction,
        zoom: viewport.scale * correction,
    }
}

/// Push the camera for `viewport` to every registered canvas.
pub fn sync_cameras(registry: &mut InstanceRegistry, viewport: &Viewport, geometry: Option<&PageGeometry>) -> CanvasCamera {
    let camera = camera_for(viewport, geometry);
    debug!(x = camera.x, y = camera.y, zoom = camera.zoom, instances = registry.len(), "syncing cameras");
    for (_, canvas) in registry.iter_mut() {
        canvas.set_camera(camera, CameraOptions::forced());
    }
    camera
}
