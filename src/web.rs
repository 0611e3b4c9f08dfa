//! Browser bindings (`web` feature).
//!
//! [`WebPainter`] wraps a [`PainterController`] persisting to `localStorage`
//! and talking to drawing editors through [`JsEditor`]. DOM events go in;
//! every resulting [`Action`] except `preventDefault` is handed to the host's
//! action callback as a plain JS object (`{ type: "pageChanged", pageIndex: 2 }`).
//! The host owns the PDF renderer and reports document and page loads back.

use js_sys::{Function, JSON};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DomRect, Element, KeyboardEvent, MouseEvent, WheelEvent};

use crate::canvas::{AnnotationCanvas, CameraOptions, CanvasCamera, CanvasError};
use crate::config::PainterConfig;
use crate::geometry::{PageGeometry, Point};
use crate::input::{Buttons, DragMode, Key, PointerInput, WheelInput};
use crate::painter::{Action, PainterController};
use crate::registry::InstanceOptions;
use crate::snapshot::PersistedSnapshot;
use crate::storage::{KeyValueStore, StorageError};

/// Install the panic hook and route log output to the browser console.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        debug!("console logger already installed");
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    let text = serde_json::to_string(value).map_err(|e| e.to_string())?;
    JSON::parse(&text).map_err(|e| describe(&e))
}

fn from_js(value: &JsValue) -> Result<Value, String> {
    let text = JSON::stringify(value).map_err(|e| describe(&e))?;
    serde_json::from_str(&String::from(text)).map_err(|e| e.to_string())
}

// =============================================================
// localStorage
// =============================================================

/// `window.localStorage` as a [`KeyValueStore`].
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open the window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] outside a window context or when
    /// the browser has storage disabled.
    pub fn open() -> Result<Self, StorageError> {
        let Some(window) = web_sys::window() else {
            return Err(StorageError::Unavailable("no window".into()));
        };
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable("localStorage is disabled".into())),
            Err(err) => Err(StorageError::Unavailable(describe(&err))),
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| StorageError::Backend(describe(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // setItem only throws for QuotaExceededError (or its vendor aliases).
        self.storage.set_item(key, value).map_err(|_| StorageError::QuotaExceeded)
    }

    fn remove(&mut self, key: &str) {
        if let Err(err) = self.storage.remove_item(key) {
            warn!(key, error = %describe(&err), "localStorage remove failed");
        }
    }
}

// =============================================================
// Drawing editor
// =============================================================

#[wasm_bindgen]
extern "C" {
    /// A drawing editor instance created by the host.
    pub type JsEditor;

    #[wasm_bindgen(method, catch, js_name = getSnapshot)]
    fn get_snapshot(this: &JsEditor) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = loadSnapshot)]
    fn load_snapshot(this: &JsEditor, snapshot: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setCamera)]
    fn set_camera(this: &JsEditor, camera: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = setCameraOptions)]
    fn set_camera_options(this: &JsEditor, options: &JsValue);

    #[wasm_bindgen(method, js_name = selectNone)]
    fn select_none(this: &JsEditor);

    #[wasm_bindgen(method, js_name = updateInstanceState)]
    fn update_instance_state(this: &JsEditor, state: &JsValue);
}

/// Adapts a [`JsEditor`] to [`AnnotationCanvas`].
pub struct JsEditorCanvas {
    editor: JsEditor,
}

impl JsEditorCanvas {
    #[must_use]
    pub fn new(editor: JsEditor) -> Self {
        Self { editor }
    }

    fn call_with<T: Serialize>(&self, what: &str, value: &T, call: impl FnOnce(&JsEditor, &JsValue)) {
        match to_js(value) {
            Ok(js) => call(&self.editor, &js),
            Err(error) => warn!(%error, what, "could not convert editor argument"),
        }
    }
}

impl AnnotationCanvas for JsEditorCanvas {
    fn get_snapshot(&self) -> Result<Value, CanvasError> {
        let raw = self.editor.get_snapshot().map_err(|err| {
            debug!(error = %describe(&err), "editor getSnapshot threw");
            CanvasError::Detached
        })?;
        from_js(&raw).map_err(CanvasError::InvalidSnapshot)
    }

    fn load_snapshot(&mut self, snapshot: &Value) -> Result<(), CanvasError> {
        let js = to_js(snapshot).map_err(CanvasError::InvalidSnapshot)?;
        self.editor.load_snapshot(&js).map_err(|err| CanvasError::InvalidSnapshot(describe(&err)))
    }

    fn set_camera(&mut self, camera: CanvasCamera, options: CameraOptions) {
        match to_js(&options) {
            Ok(options) => self.call_with("camera", &camera, |editor, camera| editor.set_camera(camera, &options)),
            Err(error) => warn!(%error, "could not convert camera options"),
        }
    }

    fn lock_camera(&mut self) {
        self.call_with("camera options", &serde_json::json!({ "isLocked": true }), JsEditor::set_camera_options);
    }

    fn clear_selection(&mut self) {
        self.editor.select_none();
    }

    fn set_interactive(&mut self, interactive: bool) {
        let state = serde_json::json!({ "isReadonly": !interactive });
        self.call_with("instance state", &state, JsEditor::update_instance_state);
    }
}

// =============================================================
// Painter
// =============================================================

/// The painter as seen from JavaScript.
#[wasm_bindgen]
pub struct WebPainter {
    inner: PainterController<LocalStorage>,
    on_action: Option<Function>,
    container: Option<Element>,
}

#[wasm_bindgen]
impl WebPainter {
    /// Create a painter from an options object (`{ painterId, documentUrl?, zoomStep?, emptySnapshot? }`).
    ///
    /// # Errors
    ///
    /// Throws if the options do not validate or `localStorage` is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new(options: &JsValue) -> Result<WebPainter, JsError> {
        let raw = JSON::stringify(options).map_err(|e| JsError::new(&describe(&e)))?;
        let config = PainterConfig::from_json(&String::from(raw))?;
        let storage = LocalStorage::open()?;
        Ok(Self { inner: PainterController::new(config, storage)?, on_action: None, container: None })
    }

    /// Receive every action as `callback(action)`.
    #[wasm_bindgen(js_name = setActionHandler)]
    pub fn set_action_handler(&mut self, callback: Function) {
        self.on_action = Some(callback);
    }

    /// The element whose origin wheel offsets are measured against.
    #[wasm_bindgen(js_name = setContainer)]
    pub fn set_container(&mut self, container: Element) {
        self.container = Some(container);
    }

    pub fn start(&mut self) {
        let actions = self.inner.start();
        self.dispatch(actions);
    }

    // --- Instances and snapshots ---

    /// Register an editor; `readOnly` keeps it view-only in every drag mode.
    #[wasm_bindgen(js_name = registerInstance)]
    pub fn register_instance(&mut self, instance_id: &str, editor: JsEditor, read_only: Option<bool>) {
        let options = InstanceOptions { read_only: read_only.unwrap_or(false) };
        self.inner.register_instance_with(instance_id, Box::new(JsEditorCanvas::new(editor)), options);
    }

    #[wasm_bindgen(js_name = setInstanceReadOnly)]
    pub fn set_instance_read_only(&mut self, instance_id: &str, read_only: bool) -> bool {
        self.inner.set_instance_read_only(instance_id, read_only)
    }

    #[wasm_bindgen(js_name = unregisterInstance)]
    pub fn unregister_instance(&mut self, instance_id: &str) -> bool {
        self.inner.unregister_instance(instance_id)
    }

    /// The stored snapshot, or `null`.
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self, instance_id: &str, page_index: u32) -> JsValue {
        match self.inner.get_snapshot(instance_id, page_index as usize) {
            Some(snapshot) => to_js(snapshot.as_value()).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = setSnapshot)]
    pub fn set_snapshot(&mut self, instance_id: &str, page_index: u32, snapshot: &JsValue) -> bool {
        match from_js(snapshot) {
            Ok(value) => self.inner.set_snapshot(instance_id, page_index as usize, &PersistedSnapshot(value)),
            Err(error) => {
                warn!(instance = instance_id, %error, "snapshot is not serializable");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = clearSnapshot)]
    pub fn clear_snapshot(&mut self, instance_id: &str, page_index: u32) {
        self.inner.clear_snapshot(instance_id, page_index as usize);
    }

    #[wasm_bindgen(js_name = loadEditorSnapshot)]
    pub fn load_editor_snapshot(&mut self, instance_id: &str) {
        if let Some(outcome) = self.inner.load_editor_snapshot(instance_id) {
            debug!(instance = instance_id, ?outcome, "editor snapshot reloaded");
        }
    }

    #[wasm_bindgen(js_name = saveActivePage)]
    pub fn save_active_page(&mut self) {
        self.inner.save_active_page();
    }

    // --- Drag mode ---

    /// # Errors
    ///
    /// Throws for anything other than `"default"`, `"move"` or `"draw"`.
    #[wasm_bindgen(js_name = setDragMode)]
    pub fn set_drag_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let mode: DragMode = mode.parse()?;
        let actions = self.inner.set_drag_mode(mode);
        self.dispatch(actions);
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = dragMode)]
    pub fn drag_mode(&self) -> String {
        self.inner.drag_mode().to_string()
    }

    // --- Document lifecycle ---

    #[wasm_bindgen(js_name = openDocument)]
    pub fn open_document(&mut self, url: &str) {
        let actions = self.inner.open_document(url);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = onDocumentLoaded)]
    pub fn on_document_loaded(&mut self, page_count: u32) {
        let actions = self.inner.on_document_loaded(page_count as usize);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = onDocumentFailed)]
    pub fn on_document_failed(&mut self) {
        let actions = self.inner.on_document_failed();
        self.dispatch(actions);
    }

    /// The current page rendered; `width`/`height` are its natural size.
    #[wasm_bindgen(js_name = onPageLoaded)]
    pub fn on_page_loaded(&mut self, width: f64, height: f64) {
        let actions = self.inner.on_page_loaded(PageGeometry::new(width, height));
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = onPageFailed)]
    pub fn on_page_failed(&mut self) {
        let actions = self.inner.on_page_loaded(None);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = onItemClick)]
    pub fn on_item_click(&mut self, page_index: u32) {
        let actions = self.inner.on_item_click(page_index as usize);
        self.dispatch(actions);
    }

    // --- Viewport ---

    #[wasm_bindgen(js_name = setPageIndex)]
    pub fn set_page_index(&mut self, page_index: i32) {
        let actions = self.inner.set_page_index(i64::from(page_index));
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = moveToPreviousPage)]
    pub fn move_to_previous_page(&mut self) {
        let actions = self.inner.move_to_previous_page();
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = moveToNextPage)]
    pub fn move_to_next_page(&mut self) {
        let actions = self.inner.move_to_next_page();
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = setRenderSize)]
    pub fn set_render_size(&mut self, width: f64, height: f64) {
        let actions = self.inner.set_render_size(width, height);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = setPan)]
    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        let actions = self.inner.set_pan(pan_x, pan_y);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f64) {
        let actions = self.inner.set_scale(scale);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = setRenderOptions)]
    pub fn set_render_options(&mut self, width: f64, height: f64, pan_x: f64, pan_y: f64, scale: f64) {
        let actions = self.inner.set_render_options(width, height, pan_x, pan_y, scale);
        self.dispatch(actions);
    }

    pub fn zoom(&mut self, x: f64, y: f64, scale_delta: f64) {
        let actions = self.inner.zoom(Point::new(x, y), scale_delta);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = fitToContainer)]
    pub fn fit_to_container(&mut self, width: f64, height: f64) {
        let actions = self.inner.fit_to_container(width, height);
        self.dispatch(actions);
    }

    pub fn viewport(&self) -> JsValue {
        to_js(&self.inner.viewport()).unwrap_or(JsValue::NULL)
    }

    pub fn camera(&self) -> JsValue {
        to_js(&self.inner.camera()).unwrap_or(JsValue::NULL)
    }

    // --- DOM events ---

    #[wasm_bindgen(js_name = onWheel)]
    pub fn on_wheel(&mut self, event: &WheelEvent) {
        let wheel = WheelInput {
            offset: Point::new(f64::from(event.offset_x()), f64::from(event.offset_y())),
            target_origin: event.target().and_then(|t| t.dyn_ref::<Element>().map(origin_of)).unwrap_or_default(),
            container_origin: self.container.as_ref().map(origin_of).unwrap_or_default(),
            delta_x: event.delta_x(),
            delta_y: event.delta_y(),
            delta_z: event.delta_z(),
        };
        let actions = self.inner.on_wheel(&wheel);
        self.dispatch_for(event, actions);
    }

    #[wasm_bindgen(js_name = onPointerMove)]
    pub fn on_pointer_move(&mut self, event: &MouseEvent) {
        let pointer = PointerInput {
            position: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
            buttons: Buttons(event.buttons()),
        };
        let actions = self.inner.on_pointer_move(&pointer);
        self.dispatch_for(event, actions);
    }

    #[wasm_bindgen(js_name = onPointerUp)]
    pub fn on_pointer_up(&mut self) {
        let actions = self.inner.handle_input(crate::input::InputEvent::PointerUp);
        self.dispatch(actions);
    }

    #[wasm_bindgen(js_name = onKeyDown)]
    pub fn on_key_down(&mut self, event: &KeyboardEvent) {
        let actions = self.inner.on_key_down(&Key::new(&event.key()));
        self.dispatch_for(event, actions);
    }
}

impl WebPainter {
    fn dispatch_for(&self, event: &web_sys::Event, actions: Vec<Action>) {
        if actions.contains(&Action::PreventDefault) {
            event.prevent_default();
        }
        self.dispatch(actions);
    }

    fn dispatch(&self, actions: Vec<Action>) {
        let Some(callback) = &self.on_action else {
            return;
        };
        for action in actions {
            if action == Action::PreventDefault {
                continue;
            }
            let value = match to_js(&action) {
                Ok(value) => value,
                Err(error) => {
                    warn!(%error, "could not convert action");
                    continue;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                warn!(error = %describe(&err), "action handler threw");
            }
        }
    }
}

fn origin_of(element: &Element) -> Point {
    let rect: DomRect = element.get_bounding_client_rect();
    Point::new(rect.left(), rect.top())
}
