// Probe Outcome Domain Model

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Probe identity: (category, name), unique within a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProbeKey {
    pub category: String,
    pub name: String,
}

impl ProbeKey {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ProbeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Failure,
    Timeout,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "SUCCESS"),
            OutcomeStatus::Failure => write!(f, "FAILURE"),
            OutcomeStatus::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// Probe payload: text, ordered list of text, or an ordered mapping
///
/// Serializes untagged, so a report reads as plain JSON strings, arrays and
/// objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProbeValue {
    Text(String),
    List(Vec<String>),
    Map(ValueMap),
}

impl ProbeValue {
    pub fn text(s: impl Into<String>) -> Self {
        ProbeValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProbeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ProbeValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            ProbeValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<String> for ProbeValue {
    fn from(s: String) -> Self {
        ProbeValue::Text(s)
    }
}

impl From<&str> for ProbeValue {
    fn from(s: &str) -> Self {
        ProbeValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for ProbeValue {
    fn from(items: Vec<String>) -> Self {
        ProbeValue::List(items)
    }
}

impl From<ValueMap> for ProbeValue {
    fn from(map: ValueMap) -> Self {
        ProbeValue::Map(map)
    }
}

/// Insertion-ordered string-keyed mapping
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    entries: Vec<(String, ProbeValue)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ProbeValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ProbeValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ProbeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProbeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ProbeValue>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Errors a probe capability can raise
///
/// `Timeout` is kept apart from the rest so a slow/hung probe is reported as
/// `OutcomeStatus::Timeout` rather than a generic failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("command failed: {0}")]
    Command(String),

    #[error("probe panicked: {0}")]
    Panicked(String),
}

impl ProbeError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ProbeError::Failed(msg.into())
    }
}

/// Result of running one probe once
///
/// Constructed through `success`/`failure`/`timeout` so that a value is only
/// ever present on success and an error message only on failure or timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<ProbeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    duration_ms: i64,
}

/// Message recorded for probes that never produced an outcome
pub const DID_NOT_COMPLETE: &str = "did not complete";

impl ProbeOutcome {
    pub fn success(value: impl Into<ProbeValue>, duration_ms: i64) -> Self {
        Self {
            status: OutcomeStatus::Success,
            value: Some(value.into()),
            error_message: None,
            duration_ms,
        }
    }

    pub fn failure(message: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            value: None,
            error_message: Some(message.into()),
            duration_ms,
        }
    }

    pub fn timeout(message: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            status: OutcomeStatus::Timeout,
            value: None,
            error_message: Some(message.into()),
            duration_ms,
        }
    }

    /// Synthetic outcome for a probe cut off by cancellation
    pub fn did_not_complete() -> Self {
        Self::failure(DID_NOT_COMPLETE, 0)
    }

    /// Convert a capability result into an outcome
    pub fn from_result(result: Result<ProbeValue, ProbeError>, duration_ms: i64) -> Self {
        match result {
            Ok(value) => Self::success(value, duration_ms),
            Err(e @ ProbeError::Timeout(_)) => Self::timeout(e.to_string(), duration_ms),
            Err(e) => Self::failure(e.to_string(), duration_ms),
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn value(&self) -> Option<&ProbeValue> {
        self.value.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
