use super::*;
use crate::canvas::{CameraOptions, CanvasCamera};
use crate::testing::RecordingCanvas;

#[test]
fn new_registry_is_empty() {
    let registry = InstanceRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[test]
fn register_locks_camera() {
    let mut registry = InstanceRegistry::new();
    let (canvas, log) = RecordingCanvas::boxed();
    assert!(registry.register("host", canvas).is_none());
    assert!(log.borrow().camera_locked);
    assert!(registry.contains("host"));
}

#[test]
fn remount_replaces_handle() {
    let mut registry = InstanceRegistry::new();
    let (first, _) = RecordingCanvas::boxed();
    let (second, second_log) = RecordingCanvas::boxed();
    registry.register("host", first);
    assert!(registry.register("host", second).is_some());
    assert_eq!(registry.len(), 1);

    if let Some(canvas) = registry.get_mut("host") {
        canvas.set_camera(CanvasCamera::default(), CameraOptions::forced());
    }
    assert_eq!(second_log.borrow().cameras.len(), 1);
}

#[test]
fn unregister_removes_instance() {
    let mut registry = InstanceRegistry::new();
    let (canvas, _) = RecordingCanvas::boxed();
    registry.register("guest", canvas);
    assert!(registry.unregister("guest").is_some());
    assert!(!registry.contains("guest"));
    assert!(registry.unregister("guest").is_none());
}

#[test]
fn ids_lists_every_instance() {
    let mut registry = InstanceRegistry::new();
    for id in ["host", "guest"] {
        let (canvas, _) = RecordingCanvas::boxed();
        registry.register(id, canvas);
    }
    let mut ids: Vec<&str> = registry.ids().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["guest", "host"]);
}

#[test]
fn iter_mut_reaches_every_canvas() {
    let mut registry = InstanceRegistry::new();
    let (a, a_log) = RecordingCanvas::boxed();
    let (b, b_log) = RecordingCanvas::boxed();
    registry.register("a", a);
    registry.register("b", b);
    for (_, canvas) in registry.iter_mut() {
        canvas.clear_selection();
    }
    assert_eq!(a_log.borrow().selection_clears, 1);
    assert_eq!(b_log.borrow().selection_clears, 1);
}

#[test]
fn debug_lists_ids() {
    let mut registry = InstanceRegistry::new();
    let (canvas, _) = RecordingCanvas::boxed();
    registry.register("host", canvas);
    assert!(format!("{registry:?}").contains("host"));
}

// =============================================================
// Read-only instances
// =============================================================

#[test]
fn read_only_instance_ignores_interactive_mode() {
    let mut registry = InstanceRegistry::new();
    let (host, host_log) = RecordingCanvas::boxed();
    let (guest, guest_log) = RecordingCanvas::boxed();
    registry.register("host", host);
    registry.register_with("guest", guest, InstanceOptions::read_only());

    registry.apply_interactivity(true);
    assert_eq!(host_log.borrow().interactive, Some(true));
    assert_eq!(guest_log.borrow().interactive, Some(false));
    assert_eq!(registry.is_read_only("guest"), Some(true));
    assert_eq!(registry.is_read_only("nobody"), None);
}

#[test]
fn set_read_only_reapplies_interactivity() {
    let mut registry = InstanceRegistry::new();
    let (guest, log) = RecordingCanvas::boxed();
    registry.register_with("guest", guest, InstanceOptions::read_only());

    assert!(registry.set_read_only("guest", false, true));
    assert_eq!(log.borrow().interactive, Some(true));
    assert!(registry.set_read_only("guest", true, true));
    assert_eq!(log.borrow().interactive, Some(false));
    assert!(!registry.set_read_only("nobody", true, true));
}
