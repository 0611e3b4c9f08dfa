//! Registry of live annotation canvases, keyed by instance id.
//!
//! Register and unregister are the only mutators of membership. Instances
//! outlive page changes; only their content is swapped by the snapshot store.
//! Each instance carries its own read-only flag: a read-only canvas never
//! accepts pointer input, whatever the drag mode.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::canvas::AnnotationCanvas;

/// Per-instance options supplied at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstanceOptions {
    /// The instance is view-only, even in `draw` mode.
    pub read_only: bool,
}

impl InstanceOptions {
    #[must_use]
    pub fn read_only() -> Self {
        Self { read_only: true }
    }
}

struct Instance {
    canvas: Box<dyn AnnotationCanvas>,
    options: InstanceOptions,
}

impl Instance {
    fn apply_interactivity(&mut self, mode_interactive: bool) {
        self.canvas.set_interactive(mode_interactive && !self.options.read_only);
    }
}

/// Owned mapping from instance id to canvas handle.
#[derive(Default)]
pub struct InstanceRegistry {
    instances: HashMap<String, Instance>,
}

impl InstanceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an editable `canvas` under `id`. See [`InstanceRegistry::register_with`].
    pub fn register(&mut self, id: &str, canvas: Box<dyn AnnotationCanvas>) -> Option<Box<dyn AnnotationCanvas>> {
        self.register_with(id, canvas, InstanceOptions::default())
    }

    /// Register `canvas` under `id`, locking its camera.
    ///
    /// A remount under an existing id replaces the handle; the previous one is returned.
    pub fn register_with(
        &mut self,
        id: &str,
        mut canvas: Box<dyn AnnotationCanvas>,
        options: InstanceOptions,
    ) -> Option<Box<dyn AnnotationCanvas>> {
        canvas.lock_camera();
        let previous = self.instances.insert(id.to_owned(), Instance { canvas, options });
        if previous.is_some() {
            debug!(instance = %id, read_only = options.read_only, "replaced canvas handle");
        } else {
            info!(instance = %id, read_only = options.read_only, "registered canvas");
        }
        previous.map(|instance| instance.canvas)
    }

    /// Remove the canvas registered under `id`.
    pub fn unregister(&mut self, id: &str) -> Option<Box<dyn AnnotationCanvas>> {
        let removed = self.instances.remove(id);
        if removed.is_some() {
            info!(instance = %id, "unregistered canvas");
        }
        removed.map(|instance| instance.canvas)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Registered instance ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_read_only(&self, id: &str) -> Option<bool> {
        self.instances.get(id).map(|instance| instance.options.read_only)
    }

    /// Change one instance's read-only flag and re-apply its interactivity.
    ///
    /// Returns `false` for an unknown id.
    pub fn set_read_only(&mut self, id: &str, read_only: bool, mode_interactive: bool) -> bool {
        let Some(instance) = self.instances.get_mut(id) else {
            return false;
        };
        instance.options.read_only = read_only;
        instance.apply_interactivity(mode_interactive);
        true
    }

    /// Tell one canvas whether it accepts input under the current drag mode.
    pub fn apply_interactivity_to(&mut self, id: &str, mode_interactive: bool) {
        if let Some(instance) = self.instances.get_mut(id) {
            instance.apply_interactivity(mode_interactive);
        }
    }

    /// Tell every canvas whether it accepts input under the current drag mode.
    pub fn apply_interactivity(&mut self, mode_interactive: bool) {
        for instance in self.instances.values_mut() {
            instance.apply_interactivity(mode_interactive);
        }
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn AnnotationCanvas + 'static)> {
        self.instances.get_mut(id).map(|instance| instance.canvas.as_mut())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut (dyn AnnotationCanvas + 'static))> {
        self.instances.iter_mut().map(|(id, instance)| (id.as_str(), instance.canvas.as_mut()))
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry").field("ids", &self.instances.keys().collect::<Vec<_>>()).finish()
    }
}
