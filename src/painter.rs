use tracing::{debug, info};

use crate::camera_sync::{camera_for, sync_cameras};
use crate::canvas::{AnnotationCanvas, CameraOptions, CanvasCamera};
use crate::config::{ConfigError, PainterConfig};
use crate::geometry::{PageGeometry, Point, Size};
use crate::gesture::{Gesture, GestureController, PageStep, zoom_about};
use crate::input::{DragMode, InputEvent, Key, PointerInput, WheelInput};
use crate::registry::{InstanceOptions, InstanceRegistry};
use crate::snapshot::{LoadOutcome, PersistedSnapshot, SnapshotStore};
use crate::storage::KeyValueStore;
use crate::viewport::{Viewport, ViewportModel};

#[cfg(test)]
#[path = "painter_test.rs"]
mod painter_test;

/// Notifications returned from painter operations for the host to process.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// The host should (re)load this document in the PDF renderer.
    DocumentRequested { url: String },
    /// A document finished loading (`Some`) or failed to load (`None`).
    #[serde(rename_all = "camelCase")]
    DocumentChanged { page_count: Option<usize> },
    /// The visible page changed; the renderer should load it.
    #[serde(rename_all = "camelCase")]
    PageChanged { page_index: usize },
    ViewportChanged { viewport: Viewport },
    DragModeChanged { mode: DragMode },
    /// The triggering DOM event must not reach the browser's default handling.
    PreventDefault,
}

/// The painter: one viewport shared by any number of annotation canvases.
///
/// Every entry point funnels through here. Viewport changes fan out in a
/// fixed order: page transition (save the outgoing page, then load the
/// incoming one), then a forced camera push to every canvas, then the
/// notifications. A call that leaves the viewport unchanged does none of it.
pub struct PainterController<S> {
    config: PainterConfig,
    model: ViewportModel,
    gestures: GestureController,
    drag_mode: DragMode,
    registry: InstanceRegistry,
    snapshots: SnapshotStore<S>,
    /// Page whose annotations the canvases currently hold.
    active_page: Option<usize>,
    /// Last container box reported by layout, used to refit on page load.
    container: Option<Size>,
}

impl<S: KeyValueStore> PainterController<S> {
    /// Create a painter persisting through `storage`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` does not validate.
    pub fn new(config: PainterConfig, storage: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let snapshots = SnapshotStore::new(config.painter_id.clone(), storage, config.empty_snapshot());
        info!(painter = %config.painter_id, "painter created");
        Ok(Self {
            config,
            model: ViewportModel::new(),
            gestures: GestureController::new(),
            drag_mode: DragMode::default(),
            registry: InstanceRegistry::new(),
            snapshots,
            active_page: None,
            container: None,
        })
    }

    /// Actions to run once the host has mounted the painter.
    pub fn start(&mut self) -> Vec<Action> {
        match self.config.document_url.clone() {
            Some(url) => vec![Action::DocumentRequested { url }],
            None => Vec::new(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &PainterConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.model.viewport()
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        self.model.page_index()
    }

    #[must_use]
    pub fn page_count(&self) -> Option<usize> {
        self.model.page_count()
    }

    #[must_use]
    pub fn page_geometry(&self) -> Option<PageGeometry> {
        self.model.geometry()
    }

    #[must_use]
    pub fn render_size(&self) -> Size {
        self.model.render_size()
    }

    #[must_use]
    pub fn pan(&self) -> Point {
        self.model.pan()
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.model.scale()
    }

    #[must_use]
    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    /// The camera currently pushed to every canvas.
    #[must_use]
    pub fn camera(&self) -> CanvasCamera {
        camera_for(&self.model.viewport(), self.model.geometry().as_ref())
    }

    /// Page whose annotations are loaded into the canvases, if any.
    #[must_use]
    pub fn active_page(&self) -> Option<usize> {
        self.active_page
    }

    #[must_use]
    pub fn is_registered(&self, instance_id: &str) -> bool {
        self.registry.contains(instance_id)
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.registry.len()
    }

    // --- Instances ---

    /// Register an editable annotation canvas under `instance_id`.
    pub fn register_instance(&mut self, instance_id: &str, canvas: Box<dyn AnnotationCanvas>) {
        self.register_instance_with(instance_id, canvas, InstanceOptions::default());
    }

    /// Register an annotation canvas under `instance_id`.
    ///
    /// The canvas's camera is locked and synced, its interactivity follows the
    /// drag mode and its read-only flag, and if a page is already active its
    /// saved annotations are loaded right away.
    pub fn register_instance_with(&mut self, instance_id: &str, canvas: Box<dyn AnnotationCanvas>, options: InstanceOptions) {
        self.registry.register_with(instance_id, canvas, options);
        self.registry.apply_interactivity_to(instance_id, self.drag_mode.canvases_interactive());
        let camera = self.camera();
        let Some(canvas) = self.registry.get_mut(instance_id) else {
            return;
        };
        canvas.set_camera(camera, CameraOptions::forced());
        if let Some(page) = self.active_page {
            self.snapshots.load_into_canvas(instance_id, page, canvas);
        }
    }

    /// Make one instance view-only (or editable again). Returns `false` for an unknown id.
    pub fn set_instance_read_only(&mut self, instance_id: &str, read_only: bool) -> bool {
        self.registry.set_read_only(instance_id, read_only, self.drag_mode.canvases_interactive())
    }

    #[must_use]
    pub fn is_instance_read_only(&self, instance_id: &str) -> Option<bool> {
        self.registry.is_read_only(instance_id)
    }

    /// Remove an instance, saving its annotations for the active page first.
    pub fn unregister_instance(&mut self, instance_id: &str) -> bool {
        let Some(mut canvas) = self.registry.unregister(instance_id) else {
            return false;
        };
        if let Some(page) = self.active_page {
            self.snapshots.save_from_canvas(instance_id, page, canvas.as_mut());
        }
        true
    }

    // --- Snapshots ---

    #[must_use]
    pub fn get_snapshot(&self, instance_id: &str, page_index: usize) -> Option<PersistedSnapshot> {
        self.snapshots.get_snapshot(instance_id, page_index)
    }

    pub fn set_snapshot(&mut self, instance_id: &str, page_index: usize, snapshot: &PersistedSnapshot) -> bool {
        self.snapshots.set_snapshot(instance_id, page_index, snapshot)
    }

    pub fn clear_snapshot(&mut self, instance_id: &str, page_index: usize) {
        self.snapshots.clear_snapshot(instance_id, page_index);
    }

    /// Re-read one instance's saved annotations for the active page into its canvas.
    pub fn load_editor_snapshot(&mut self, instance_id: &str) -> Option<LoadOutcome> {
        let page = self.active_page?;
        let canvas = self.registry.get_mut(instance_id)?;
        Some(self.snapshots.load_into_canvas(instance_id, page, canvas))
    }

    /// Persist every canvas for the active page (e.g. before the host unloads).
    pub fn save_active_page(&mut self) {
        if let Some(page) = self.active_page {
            self.snapshots.save_page_all(&mut self.registry, page);
        }
    }

    /// Snapshot helpers bound to one instance.
    pub fn instance<'a>(&'a mut self, instance_id: &'a str) -> InstanceSnapshots<'a, S> {
        InstanceSnapshots { instance_id, snapshots: &mut self.snapshots }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        self.snapshots.storage()
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.snapshots.storage_mut()
    }

    // --- Drag mode ---

    /// Switch the interaction mode. Any drag in progress is dropped.
    pub fn set_drag_mode(&mut self, mode: DragMode) -> Vec<Action> {
        if mode == self.drag_mode {
            return Vec::new();
        }
        debug!(from = %self.drag_mode, to = %mode, "drag mode changed");
        self.drag_mode = mode;
        self.gestures.on_pointer_up();
        self.registry.apply_interactivity(mode.canvases_interactive());
        vec![Action::DragModeChanged { mode }]
    }

    // --- Document lifecycle ---

    /// Switch to another document, starting again from its first page unzoomed.
    ///
    /// The active page is saved first; the new document's annotations load
    /// once it reports its page count.
    pub fn open_document(&mut self, url: &str) -> Vec<Action> {
        info!(url = %url, "opening document");
        self.save_active_page();
        self.active_page = None;
        let before = self.model.viewport();
        let render_size = self.model.render_size();
        self.model = ViewportModel::new();
        self.model.set_render_size(render_size);
        self.config.document_url = Some(url.to_owned());
        let mut actions = vec![Action::DocumentRequested { url: url.to_owned() }];
        actions.extend(self.settle(before, false));
        actions
    }

    /// The PDF renderer loaded a document with `page_count` pages.
    pub fn on_document_loaded(&mut self, page_count: usize) -> Vec<Action> {
        info!(page_count, "document loaded");
        if page_count == 0 {
            // No page to move to: park the active one instead of transitioning.
            self.save_active_page();
            self.active_page = None;
        }
        let before = self.model.viewport();
        self.model.set_page_count(Some(page_count));
        let mut actions = vec![Action::DocumentChanged { page_count: Some(page_count) }];
        actions.extend(self.settle(before, false));
        if self.active_page.is_none() && page_count > 0 {
            let page = self.model.page_index();
            self.activate_page(page);
            actions.push(Action::PageChanged { page_index: page });
        }
        actions
    }

    /// The PDF renderer failed to load the document.
    ///
    /// Viewport math is deferred until a document loads again; the viewport
    /// itself keeps its last-known-good value.
    pub fn on_document_failed(&mut self) -> Vec<Action> {
        info!("document failed to load");
        self.model.set_page_count(None);
        self.model.set_geometry(None);
        vec![Action::DocumentChanged { page_count: None }]
    }

    /// The PDF renderer finished loading the current page (`None` on failure).
    pub fn on_page_loaded(&mut self, geometry: Option<PageGeometry>) -> Vec<Action> {
        let before = self.model.viewport();
        let geometry_changed = self.model.geometry() != geometry;
        self.model.set_geometry(geometry);
        if geometry.is_some() {
            if let Some(container) = self.container {
                self.apply_fit(container);
            }
        }
        self.settle(before, geometry_changed)
    }

    /// A link inside the rendered page was clicked.
    pub fn on_item_click(&mut self, page_index: usize) -> Vec<Action> {
        self.set_page_index(i64::try_from(page_index).unwrap_or(i64::MAX))
    }

    // --- Viewport mutators ---

    pub fn set_page_index(&mut self, page_index: i64) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.set_page_index(page_index);
        self.settle(before, false)
    }

    pub fn move_to_previous_page(&mut self) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.move_to_previous_page();
        self.settle(before, false)
    }

    pub fn move_to_next_page(&mut self) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.move_to_next_page();
        self.settle(before, false)
    }

    pub fn set_render_size(&mut self, width: f64, height: f64) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.set_render_size(Size::new(width, height));
        self.settle(before, false)
    }

    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.set_pan(Point::new(pan_x, pan_y));
        self.settle(before, false)
    }

    pub fn set_scale(&mut self, scale: f64) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.set_scale(scale);
        self.settle(before, false)
    }

    /// Set size, pan and scale in one clamped update.
    pub fn set_render_options(&mut self, width: f64, height: f64, pan_x: f64, pan_y: f64, scale: f64) -> Vec<Action> {
        let before = self.model.viewport();
        self.model.set_render_options(Size::new(width, height), Point::new(pan_x, pan_y), scale);
        self.settle(before, false)
    }

    /// Zoom by `scale_delta` (e.g. `0.2`) keeping the point at `offset` fixed.
    pub fn zoom(&mut self, offset: Point, scale_delta: f64) -> Vec<Action> {
        let viewport = self.model.viewport();
        match zoom_about(&viewport, self.model.geometry().as_ref(), offset, scale_delta) {
            Some(gesture) => self.apply_gesture(gesture),
            None => Vec::new(),
        }
    }

    /// Pan by a delta given in render pixels.
    pub fn drag(&mut self, delta: Point) -> Vec<Action> {
        let vp = self.model.viewport();
        self.set_pan(vp.pan_x + delta.x / vp.scale, vp.pan_y + delta.y / vp.scale)
    }

    /// Size the render target to the largest page-shaped box inside `width` × `height`.
    ///
    /// Remembered so the fit is redone when the next page loads. Re-applying
    /// an unchanged size is a no-op, so observers that fire on our own resize
    /// settle immediately.
    pub fn fit_to_container(&mut self, width: f64, height: f64) -> Vec<Action> {
        let container = Size::new(width, height);
        self.container = Some(container);
        let before = self.model.viewport();
        self.apply_fit(container);
        self.settle(before, false)
    }

    // --- Input ---

    /// Dispatch one input event.
    pub fn handle_input(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::Wheel(wheel) => self.on_wheel(&wheel),
            InputEvent::PointerMove(pointer) => self.on_pointer_move(&pointer),
            InputEvent::PointerUp => {
                self.gestures.on_pointer_up();
                Vec::new()
            }
            InputEvent::KeyDown(key) => self.on_key_down(&key),
            InputEvent::Resize { width, height } => self.fit_to_container(width, height),
        }
    }

    /// Zoom about the pointer. Always asks the host to suppress native scrolling.
    pub fn on_wheel(&mut self, wheel: &WheelInput) -> Vec<Action> {
        let viewport = self.model.viewport();
        let gesture = self.gestures.on_wheel(wheel, &viewport, self.model.geometry().as_ref(), self.config.zoom_step);
        let mut actions = vec![Action::PreventDefault];
        if let Some(gesture) = gesture {
            actions.extend(self.apply_gesture(gesture));
        }
        actions
    }

    pub fn on_pointer_move(&mut self, pointer: &PointerInput) -> Vec<Action> {
        let viewport = self.model.viewport();
        match self.gestures.on_pointer_move(pointer, self.drag_mode, &viewport) {
            Some(gesture) => {
                let mut actions = vec![Action::PreventDefault];
                actions.extend(self.apply_gesture(gesture));
                actions
            }
            None => Vec::new(),
        }
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        match self.gestures.on_key_down(key) {
            Some(gesture) => self.apply_gesture(gesture),
            None => Vec::new(),
        }
    }

    // --- Internals ---

    fn apply_gesture(&mut self, gesture: Gesture) -> Vec<Action> {
        let before = self.model.viewport();
        match gesture {
            Gesture::View { pan, scale } => self.model.set_view(pan, scale),
            Gesture::Pan(pan) => self.model.set_pan(pan),
            Gesture::Page(PageStep::Previous) => self.model.move_to_previous_page(),
            Gesture::Page(PageStep::Next) => self.model.move_to_next_page(),
        };
        self.settle(before, false)
    }

    fn apply_fit(&mut self, container: Size) {
        let Some(geometry) = self.model.geometry() else {
            return;
        };
        let Some(fitted) = geometry.fit_within(container) else {
            return;
        };
        if fitted != self.model.render_size() {
            self.model.set_render_size(fitted);
        }
    }

    /// Fan out whatever changed since `before`.
    fn settle(&mut self, before: Viewport, geometry_changed: bool) -> Vec<Action> {
        let after = self.model.viewport();
        let mut actions = Vec::new();
        if after.page_index != before.page_index && self.active_page.is_some() {
            self.activate_page(after.page_index);
            actions.push(Action::PageChanged { page_index: after.page_index });
        }
        if after != before || geometry_changed {
            sync_cameras(&mut self.registry, &after, self.model.geometry().as_ref());
        }
        if after != before {
            actions.push(Action::ViewportChanged { viewport: after });
        }
        actions
    }

    /// Save the outgoing page's annotations, then load `page` into every canvas.
    fn activate_page(&mut self, page: usize) {
        if let Some(previous) = self.active_page {
            if previous == page {
                return;
            }
            debug!(from = previous, to = page, "page transition");
            self.snapshots.save_page_all(&mut self.registry, previous);
        }
        self.snapshots.load_page_all(&mut self.registry, page);
        self.active_page = Some(page);
    }
}

/// Snapshot access bound to a single instance id.
pub struct InstanceSnapshots<'a, S> {
    instance_id: &'a str,
    snapshots: &'a mut SnapshotStore<S>,
}

impl<S: KeyValueStore> InstanceSnapshots<'_, S> {
    #[must_use]
    pub fn id(&self) -> &str {
        self.instance_id
    }

    #[must_use]
    pub fn get_snapshot(&self, page_index: usize) -> Option<PersistedSnapshot> {
        self.snapshots.get_snapshot(self.instance_id, page_index)
    }

    pub fn set_snapshot(&mut self, page_index: usize, snapshot: &PersistedSnapshot) -> bool {
        self.snapshots.set_snapshot(self.instance_id, page_index, snapshot)
    }

    pub fn clear_snapshot(&mut self, page_index: usize) {
        self.snapshots.clear_snapshot(self.instance_id, page_index);
    }
}
