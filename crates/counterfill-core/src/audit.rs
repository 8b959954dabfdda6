//! The "was" map: the last value a merge overwrote, per field.
//!
//! One slot per field, not a history. The trail is serialized with the
//! record (`was_notes`) and is never cleared by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RecordError;

/// Prefix of the note rendered under an overwritten field.
pub const WAS_PREFIX: &str = "Было:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
    entries: BTreeMap<String, String>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `previous` as the overwritten value of `key`. Blank values
    /// are ignored: nothing was overwritten.
    pub fn record(&mut self, key: &str, previous: &str) {
        let previous = previous.trim();
        if previous.is_empty() {
            return;
        }
        self.entries.insert(key.to_string(), previous.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Explicit reset, e.g. after the caller decides a save closes the session.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Было: <previous>` for the field, if anything was overwritten.
    pub fn note(&self, key: &str) -> Option<String> {
        self.get(key).map(was_note)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a serialized trail. Malformed input yields an empty trail so a
    /// corrupted hidden field never blocks editing.
    pub fn from_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(json).unwrap_or_else(|e| {
            warn!(error = %e, "discarding malformed audit trail");
            Self::default()
        })
    }
}

pub fn was_note(previous: &str) -> String {
    format!("{WAS_PREFIX} {}", previous.trim())
}
