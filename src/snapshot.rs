//! Snapshot store: per-(instance, page) persistence of annotation layers.
//!
//! DESIGN
//! ======
//! Snapshots are opaque JSON owned by the drawing canvas. The store only
//! serializes them under a derived key, reads them back, and checks that what
//! it reads parses. Every key is namespaced by the painter id, so two painters
//! on one origin never see each other's annotations. Separators inside ids are
//! escaped, so distinct (painter, instance, page) triples never share a key.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails outward. A missing key and an unparsable payload both
//! read as "absent"; a refused write is logged and dropped, leaving the live
//! canvas untouched. A payload that does not parse, or that the canvas
//! rejects, is removed so it is never applied again. Loading falls back to the
//! canonical empty snapshot once; if the canvas rejects that too, the failure
//! is logged and loading stops.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::canvas::{AnnotationCanvas, CanvasError};
use crate::consts::{KEY_ESCAPE, KEY_SEPARATOR};
use crate::registry::InstanceRegistry;
use crate::storage::{KeyValueStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("stored snapshot is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("snapshot could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
}

/// One annotator's drawing state for one page, as the canvas serialized it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedSnapshot(pub Value);

impl PersistedSnapshot {
    /// Parse a stored payload.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Parse`] if `raw` is not valid JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(raw).map(Self).map_err(SnapshotError::Parse)
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Serialize`] if the value cannot be encoded.
    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(&self.0).map_err(SnapshotError::Serialize)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for PersistedSnapshot {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The storage key for one instance's snapshot of one page.
#[must_use]
pub fn snapshot_key(painter_id: &str, instance_id: &str, page_index: usize) -> String {
    let painter = escape_key_part(painter_id);
    let instance = escape_key_part(instance_id);
    format!("{painter}{KEY_SEPARATOR}{instance}{KEY_SEPARATOR}{page_index}")
}

fn escape_key_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        if c == KEY_SEPARATOR || c == KEY_ESCAPE {
            escaped.push(KEY_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// What [`SnapshotStore::load_into_canvas`] ended up applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The saved snapshot was applied.
    Restored,
    /// Nothing usable was saved (or the canvas rejected it); the empty snapshot was applied.
    Empty,
    /// The canvas rejected even the empty snapshot. Its content is unspecified.
    Failed,
}

/// Persists annotation layers through a [`KeyValueStore`].
#[derive(Debug)]
pub struct SnapshotStore<S> {
    painter_id: String,
    storage: S,
    empty: PersistedSnapshot,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    /// Create a store namespaced by `painter_id`; `empty` is applied when nothing usable is saved.
    pub fn new(painter_id: impl Into<String>, storage: S, empty: PersistedSnapshot) -> Self {
        Self { painter_id: painter_id.into(), storage, empty }
    }

    #[must_use]
    pub fn painter_id(&self) -> &str {
        &self.painter_id
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// The canonical empty-drawing snapshot.
    #[must_use]
    pub fn empty_snapshot(&self) -> &PersistedSnapshot {
        &self.empty
    }

    #[must_use]
    pub fn key(&self, instance_id: &str, page_index: usize) -> String {
        snapshot_key(&self.painter_id, instance_id, page_index)
    }

    // --- Raw access ---

    /// Read and parse the snapshot, surfacing why it is unusable.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails, or a parse error if the payload is corrupt.
    pub fn try_get_snapshot(&self, instance_id: &str, page_index: usize) -> Result<Option<PersistedSnapshot>, SnapshotError> {
        let key = self.key(instance_id, page_index);
        match self.storage.get(&key)? {
            Some(raw) => PersistedSnapshot::from_json_str(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// The saved snapshot, or `None` if it is missing or unreadable.
    #[must_use]
    pub fn get_snapshot(&self, instance_id: &str, page_index: usize) -> Option<PersistedSnapshot> {
        match self.try_get_snapshot(instance_id, page_index) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(key = %self.key(instance_id, page_index), error = %e, "stored snapshot is unreadable");
                None
            }
        }
    }

    /// Serialize and write the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn try_set_snapshot(&mut self, instance_id: &str, page_index: usize, snapshot: &PersistedSnapshot) -> Result<(), SnapshotError> {
        let key = self.key(instance_id, page_index);
        let raw = snapshot.to_json_string()?;
        self.storage.set(&key, &raw)?;
        Ok(())
    }

    /// Write the snapshot. A failed write is logged and otherwise ignored.
    ///
    /// Returns `true` when the write went through.
    pub fn set_snapshot(&mut self, instance_id: &str, page_index: usize, snapshot: &PersistedSnapshot) -> bool {
        match self.try_set_snapshot(instance_id, page_index, snapshot) {
            Ok(()) => true,
            Err(e) => {
                error!(key = %self.key(instance_id, page_index), error = %e, "failed to save snapshot");
                false
            }
        }
    }

    /// Remove the saved snapshot; absent keys are fine.
    pub fn clear_snapshot(&mut self, instance_id: &str, page_index: usize) {
        let key = self.key(instance_id, page_index);
        self.storage.remove(&key);
    }

    // --- Canvas transfer ---

    /// Apply the saved snapshot to `canvas`, falling back to the empty snapshot.
    ///
    /// A corrupt or rejected payload is removed from storage before the fallback.
    pub fn load_into_canvas(&mut self, instance_id: &str, page_index: usize, canvas: &mut dyn AnnotationCanvas) -> LoadOutcome {
        let key = self.key(instance_id, page_index);
        debug!(key = %key, "loading snapshot");
        match self.try_get_snapshot(instance_id, page_index) {
            Ok(Some(snapshot)) => match canvas.load_snapshot(snapshot.as_value()) {
                Ok(()) => return LoadOutcome::Restored,
                Err(e) => {
                    warn!(key = %key, error = %e, "canvas rejected stored snapshot; clearing");
                    self.storage.remove(&key);
                }
            },
            Ok(None) => {}
            Err(e @ SnapshotError::Parse(_)) => {
                warn!(key = %key, error = %e, "stored snapshot is unreadable; clearing");
                self.storage.remove(&key);
            }
            Err(e) => warn!(key = %key, error = %e, "could not read stored snapshot"),
        }
        match canvas.load_snapshot(self.empty.as_value()) {
            Ok(()) => LoadOutcome::Empty,
            Err(e) => {
                error!(key = %key, error = %e, "canvas rejected the empty snapshot");
                LoadOutcome::Failed
            }
        }
    }

    /// Persist `canvas`'s current state, with its selection cleared first.
    ///
    /// Returns `true` when the snapshot reached storage.
    pub fn save_from_canvas(&mut self, instance_id: &str, page_index: usize, canvas: &mut dyn AnnotationCanvas) -> bool {
        canvas.clear_selection();
        match canvas.get_snapshot() {
            Ok(value) => {
                debug!(key = %self.key(instance_id, page_index), "saving snapshot");
                self.set_snapshot(instance_id, page_index, &PersistedSnapshot(value))
            }
            Err(e) => {
                error!(key = %self.key(instance_id, page_index), error = %e, "failed to read canvas snapshot");
                false
            }
        }
    }

    /// Save every registered canvas's state for `page_index`.
    pub fn save_page_all(&mut self, registry: &mut InstanceRegistry, page_index: usize) {
        for (id, canvas) in registry.iter_mut() {
            self.save_from_canvas(id, page_index, canvas);
        }
    }

    /// Load `page_index` into every registered canvas.
    pub fn load_page_all(&mut self, registry: &mut InstanceRegistry, page_index: usize) {
        for (id, canvas) in registry.iter_mut() {
            self.load_into_canvas(id, page_index, canvas);
        }
    }
}
