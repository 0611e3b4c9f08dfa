//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::canvas::{AnnotationCanvas, CameraOptions, CanvasCamera, CanvasError};
use crate::storage::{KeyValueStore, StorageError};

/// Everything a [`RecordingCanvas`] has been asked to do.
#[derive(Debug, Default)]
pub struct CanvasLog {
    pub shapes: Vec<Value>,
    pub selected: Vec<String>,
    pub cameras: Vec<(CanvasCamera, CameraOptions)>,
    pub camera_locked: bool,
    pub selection_clears: usize,
    pub interactive: Option<bool>,
    pub loads: Vec<Value>,
    pub reject_all_loads: bool,
    pub detached: bool,
}

impl CanvasLog {
    pub fn last_camera(&self) -> Option<CanvasCamera> {
        self.cameras.last().map(|(camera, _)| *camera)
    }
}

/// A canvas that stores shapes as a JSON array and records every call.
///
/// Snapshots look like `{"shapes": [...], "selected": [...]}`; anything that
/// is not a JSON object is rejected as malformed.
pub struct RecordingCanvas {
    log: Rc<RefCell<CanvasLog>>,
}

impl RecordingCanvas {
    pub fn boxed() -> (Box<dyn AnnotationCanvas>, Rc<RefCell<CanvasLog>>) {
        let log = Rc::new(RefCell::new(CanvasLog::default()));
        (Box::new(Self { log: Rc::clone(&log) }), log)
    }
}

impl AnnotationCanvas for RecordingCanvas {
    fn get_snapshot(&self) -> Result<Value, CanvasError> {
        let log = self.log.borrow();
        if log.detached {
            return Err(CanvasError::Detached);
        }
        Ok(json!({ "shapes": log.shapes, "selected": log.selected }))
    }

    fn load_snapshot(&mut self, snapshot: &Value) -> Result<(), CanvasError> {
        let mut log = self.log.borrow_mut();
        log.loads.push(snapshot.clone());
        if log.reject_all_loads {
            return Err(CanvasError::InvalidSnapshot("loads disabled".into()));
        }
        let Some(object) = snapshot.as_object() else {
            return Err(CanvasError::InvalidSnapshot("not an object".into()));
        };
        log.shapes = object.get("shapes").and_then(Value::as_array).cloned().unwrap_or_default();
        log.selected = Vec::new();
        Ok(())
    }

    fn set_camera(&mut self, camera: CanvasCamera, options: CameraOptions) {
        self.log.borrow_mut().cameras.push((camera, options));
    }

    fn lock_camera(&mut self) {
        self.log.borrow_mut().camera_locked = true;
    }

    fn clear_selection(&mut self) {
        let mut log = self.log.borrow_mut();
        log.selected.clear();
        log.selection_clears += 1;
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.log.borrow_mut().interactive = Some(interactive);
    }
}

/// A store whose writes always fail.
#[derive(Debug, Default)]
pub struct FullStore;

impl KeyValueStore for FullStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded)
    }

    fn remove(&mut self, _key: &str) {}
}
