//! Host-supplied painter options.
//!
//! Hosts hand these over as a JSON object (camelCase keys). Validation runs
//! once, before a painter exists; after that nothing in the painter fails outward.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;
use serde_json::Value;

use crate::consts::ZOOM_STEP;
use crate::snapshot::PersistedSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("painter id must not be empty")]
    EmptyPainterId,
    #[error("zoom step must be in (0, 1), got {0}")]
    InvalidZoomStep(f64),
    #[error("invalid painter options: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_zoom_step() -> f64 {
    ZOOM_STEP
}

/// Options for one painter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainterConfig {
    /// Namespace for every persisted key.
    pub painter_id: String,
    /// Document to open when the painter mounts.
    #[serde(default)]
    pub document_url: Option<String>,
    /// Fractional scale change per wheel notch.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    /// The drawing canvas's clean snapshot; `{}` when not supplied.
    #[serde(default)]
    pub empty_snapshot: Option<Value>,
}

impl PainterConfig {
    #[must_use]
    pub fn new(painter_id: impl Into<String>) -> Self {
        Self { painter_id: painter_id.into(), document_url: None, zoom_step: ZOOM_STEP, empty_snapshot: None }
    }

    #[must_use]
    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_empty_snapshot(mut self, snapshot: Value) -> Self {
        self.empty_snapshot = Some(snapshot);
        self
    }

    /// Parse and validate options from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or missing fields, or
    /// a validation error (see [`PainterConfig::validate`]).
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty (or blank) painter id, or a zoom step
    /// outside `(0, 1)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.painter_id.trim().is_empty() {
            return Err(ConfigError::EmptyPainterId);
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            return Err(ConfigError::InvalidZoomStep(self.zoom_step));
        }
        Ok(())
    }

    /// The canonical empty-drawing snapshot.
    #[must_use]
    pub fn empty_snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot(self.empty_snapshot.clone().unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }
}
