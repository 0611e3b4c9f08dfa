#![allow(clippy::float_cmp)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn loaded_model(width: f64, height: f64, pages: usize) -> ViewportModel {
    let mut model = ViewportModel::new();
    model.set_page_count(Some(pages));
    model.set_geometry(PageGeometry::new(width, height));
    model
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_viewport_is_page_zero_unzoomed() {
    let vp = Viewport::default();
    assert_eq!(vp.page_index, 0);
    assert_eq!(vp.scale, 1.0);
    assert_eq!(vp.pan_x, 0.0);
    assert_eq!(vp.pan_y, 0.0);
    assert_eq!(vp.render_width, 0.0);
    assert_eq!(vp.render_height, 0.0);
}

#[test]
fn new_model_has_no_document_facts() {
    let model = ViewportModel::new();
    assert!(model.page_count().is_none());
    assert!(model.geometry().is_none());
}

#[test]
fn viewport_serializes_camel_case() {
    let json = serde_json::to_value(Viewport::default()).unwrap();
    assert_eq!(json["pageIndex"], 0);
    assert_eq!(json["scale"], 1.0);
    assert!(json.get("renderWidth").is_some());
}

// =============================================================
// Coordinate conversion
// =============================================================

#[test]
fn local_to_document_applies_pan_and_scale() {
    let vp = Viewport { pan_x: 100.0, pan_y: 50.0, scale: 2.0, ..Viewport::default() };
    let doc = vp.local_to_document(Point::new(40.0, 20.0));
    assert!(approx_eq(doc.x, 120.0));
    assert!(approx_eq(doc.y, 60.0));
}

#[test]
fn document_to_local_inverts_local_to_document() {
    let vp = Viewport { pan_x: 13.0, pan_y: 7.5, scale: 2.5, ..Viewport::default() };
    let local = Point::new(321.0, 123.0);
    let back = vp.document_to_local(vp.local_to_document(local));
    assert!(approx_eq(back.x, local.x));
    assert!(approx_eq(back.y, local.y));
}

// =============================================================
// Scale
// =============================================================

#[test]
fn set_scale_floors_at_one() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_scale(0.25);
    assert_eq!(model.scale(), 1.0);
}

#[test]
fn set_scale_accepts_zoom_in() {
    let mut model = loaded_model(800.0, 600.0, 3);
    assert!(model.set_scale(2.0));
    assert_eq!(model.scale(), 2.0);
}

#[test]
fn set_scale_without_geometry_is_noop() {
    let mut model = ViewportModel::new();
    assert!(!model.set_scale(3.0));
    assert_eq!(model.scale(), 1.0);
}

#[test]
fn set_scale_rejects_nan() {
    let mut model = loaded_model(800.0, 600.0, 3);
    assert!(!model.set_scale(f64::NAN));
    assert_eq!(model.scale(), 1.0);
}

#[test]
fn scale_floor_holds_for_random_sequences() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut model = loaded_model(800.0, 600.0, 3);
    for _ in 0..500 {
        model.set_scale(rng.random_range(-10.0..10.0));
        assert!(model.scale() >= 1.0);
    }
}

#[test]
fn zooming_out_to_one_forces_pan_to_zero() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_view(Point::new(300.0, 200.0), 4.0);
    model.set_scale(1.0);
    assert_eq!(model.pan(), Point::new(0.0, 0.0));
}

#[test]
fn set_scale_preserves_pan_where_possible() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_view(Point::new(100.0, 100.0), 4.0);
    model.set_scale(2.0);
    assert_eq!(model.pan(), Point::new(100.0, 100.0));
}

#[test]
fn set_scale_clips_pan_to_new_range() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_view(Point::new(600.0, 450.0), 4.0);
    model.set_scale(2.0);
    assert!(approx_eq(model.pan().x, 400.0));
    assert!(approx_eq(model.pan().y, 300.0));
}

// =============================================================
// Pan
// =============================================================

#[test]
fn set_pan_without_geometry_is_noop() {
    let mut model = ViewportModel::new();
    assert!(!model.set_pan(Point::new(10.0, 10.0)));
    assert_eq!(model.pan(), Point::new(0.0, 0.0));
}

#[test]
fn set_pan_at_scale_one_stays_zero() {
    let mut model = loaded_model(800.0, 600.0, 3);
    assert!(!model.set_pan(Point::new(50.0, 50.0)));
    assert_eq!(model.pan(), Point::new(0.0, 0.0));
}

#[test]
fn set_pan_clamps_negative_to_zero() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_scale(2.0);
    model.set_pan(Point::new(-30.0, -1.0));
    assert_eq!(model.pan(), Point::new(0.0, 0.0));
}

#[test]
fn set_pan_clamps_to_page_bounds() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_scale(2.0);
    model.set_pan(Point::new(9999.0, 9999.0));
    assert!(approx_eq(model.pan().x, 400.0));
    assert!(approx_eq(model.pan().y, 300.0));
}

#[test]
fn pan_clamp_holds_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(42);
    let (w, h) = (612.0, 792.0);
    let mut model = loaded_model(w, h, 1);
    for _ in 0..500 {
        let scale = rng.random_range(0.0..8.0);
        let pan = Point::new(rng.random_range(-2000.0..2000.0), rng.random_range(-2000.0..2000.0));
        model.set_view(pan, scale);
        let vp = model.viewport();
        assert!(vp.pan_x >= 0.0 && vp.pan_x <= w * (1.0 - 1.0 / vp.scale) + EPSILON);
        assert!(vp.pan_y >= 0.0 && vp.pan_y <= h * (1.0 - 1.0 / vp.scale) + EPSILON);
    }
}

// =============================================================
// Render size
// =============================================================

#[test]
fn set_render_size_replaces_size_without_touching_scale() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_scale(2.0);
    assert!(model.set_render_size(Size::new(400.0, 300.0)));
    assert_eq!(model.render_size(), Size::new(400.0, 300.0));
    assert_eq!(model.scale(), 2.0);
}

#[test]
fn set_render_size_works_before_geometry() {
    let mut model = ViewportModel::new();
    assert!(model.set_render_size(Size::new(400.0, 300.0)));
    assert_eq!(model.render_size(), Size::new(400.0, 300.0));
}

#[test]
fn identical_render_size_reports_no_change() {
    let mut model = loaded_model(800.0, 600.0, 3);
    assert!(model.set_render_size(Size::new(400.0, 300.0)));
    assert!(!model.set_render_size(Size::new(400.0, 300.0)));
}

// =============================================================
// Combined updates
// =============================================================

#[test]
fn set_render_options_updates_everything_at_once() {
    let mut model = loaded_model(800.0, 600.0, 3);
    assert!(model.set_render_options(Size::new(400.0, 300.0), Point::new(100.0, 50.0), 2.0));
    let vp = model.viewport();
    assert_eq!(vp.render_width, 400.0);
    assert_eq!(vp.pan_x, 100.0);
    assert_eq!(vp.pan_y, 50.0);
    assert_eq!(vp.scale, 2.0);
}

#[test]
fn repeated_identical_view_reports_no_change() {
    let mut model = loaded_model(800.0, 600.0, 3);
    assert!(model.set_view(Point::new(10.0, 10.0), 2.0));
    assert!(!model.set_view(Point::new(10.0, 10.0), 2.0));
}

// =============================================================
// Page index
// =============================================================

#[test]
fn set_page_index_without_document_is_rejected() {
    let mut model = ViewportModel::new();
    assert!(!model.set_page_index(1));
    assert_eq!(model.page_index(), 0);
}

#[test]
fn set_page_index_in_range() {
    let mut model = loaded_model(800.0, 600.0, 5);
    assert!(model.set_page_index(3));
    assert_eq!(model.page_index(), 3);
}

#[test]
fn set_page_index_negative_leaves_page_unchanged() {
    let mut model = loaded_model(800.0, 600.0, 5);
    model.set_page_index(2);
    assert!(!model.set_page_index(-1));
    assert_eq!(model.page_index(), 2);
}

#[test]
fn set_page_index_past_end_leaves_page_unchanged() {
    let mut model = loaded_model(800.0, 600.0, 5);
    model.set_page_index(2);
    assert!(!model.set_page_index(5));
    assert_eq!(model.page_index(), 2);
}

#[test]
fn previous_page_is_noop_on_first_page() {
    let mut model = loaded_model(800.0, 600.0, 5);
    assert!(!model.move_to_previous_page());
    assert_eq!(model.page_index(), 0);
}

#[test]
fn next_page_is_noop_on_last_page() {
    let mut model = loaded_model(800.0, 600.0, 2);
    assert!(model.move_to_next_page());
    assert!(!model.move_to_next_page());
    assert_eq!(model.page_index(), 1);
}

#[test]
fn page_navigation_keeps_pan_and_scale() {
    let mut model = loaded_model(800.0, 600.0, 3);
    model.set_view(Point::new(50.0, 40.0), 2.0);
    model.move_to_next_page();
    assert_eq!(model.scale(), 2.0);
    assert_eq!(model.pan(), Point::new(50.0, 40.0));
}

// =============================================================
// Document facts
// =============================================================

#[test]
fn shorter_document_pulls_page_index_into_range() {
    let mut model = loaded_model(800.0, 600.0, 10);
    model.set_page_index(8);
    assert!(model.set_page_count(Some(3)));
    assert_eq!(model.page_index(), 2);
}

#[test]
fn failed_document_keeps_page_index() {
    let mut model = loaded_model(800.0, 600.0, 10);
    model.set_page_index(4);
    assert!(!model.set_page_count(None));
    assert_eq!(model.page_index(), 4);
    assert!(model.page_count().is_none());
}

#[test]
fn smaller_geometry_reclamps_pan() {
    let mut model = loaded_model(800.0, 600.0, 1);
    model.set_view(Point::new(400.0, 300.0), 2.0);
    assert!(model.set_geometry(PageGeometry::new(200.0, 100.0)));
    assert!(approx_eq(model.pan().x, 100.0));
    assert!(approx_eq(model.pan().y, 50.0));
}

#[test]
fn absent_geometry_keeps_last_known_good_viewport() {
    let mut model = loaded_model(800.0, 600.0, 1);
    model.set_view(Point::new(100.0, 100.0), 2.0);
    let before = model.viewport();
    assert!(!model.set_geometry(None));
    assert_eq!(model.viewport(), before);
    assert!(model.geometry().is_none());
}
