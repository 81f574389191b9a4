use std::collections::BTreeSet;

use crate::foundation::error::{ChoreoError, ChoreoResult};

fn enabled_by_default() -> bool {
    true
}

/// A one-shot action scheduled at a point in time (not interpolated).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    /// Unique id within a timeline.
    pub id: String,
    /// Fire time in seconds.
    pub time: f64,
    /// Action name understood by the renderer (`flash`, `play_sound`, ...).
    pub action: String,
    /// Free-form action parameters.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
    /// Disabled events never fire.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Labels used for filtering.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Event {
    /// Enabled event without params or tags.
    pub fn new(id: impl Into<String>, time: f64, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time,
            action: action.into(),
            params: serde_json::Value::Null,
            enabled: true,
            tags: BTreeSet::new(),
        }
    }

    /// Attach parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set the enable flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Return `true` when the event carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Check id/action/time invariants.
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.id.trim().is_empty() {
            return Err(ChoreoError::validation("event id must be non-empty"));
        }
        if self.action.trim().is_empty() {
            return Err(ChoreoError::validation(format!(
                "event '{}' action must be non-empty",
                self.id
            )));
        }
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(ChoreoError::validation(format!(
                "event '{}' time must be finite and >= 0",
                self.id
            )));
        }
        Ok(())
    }
}
