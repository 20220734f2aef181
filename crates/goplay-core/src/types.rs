use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{PlaygroundError, Result};

/// Outcome of a single compile round trip.
///
/// When `errors` is non-empty the program never ran, so `stdout` and `stderr`
/// are both empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileResult {
    /// Compilation errors reported by the remote service
    pub errors: String,
    /// Aggregated stdout
    pub stdout: String,
    /// Aggregated stderr
    pub stderr: String,
}

impl CompileResult {
    pub fn compile_error(errors: impl Into<String>) -> Self {
        Self {
            errors: errors.into(),
            ..Default::default()
        }
    }

    pub fn is_compile_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Stream an event was written to during remote execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Stdout,
    Stderr,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompileEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: EventKind,
    /// Offset from the previous event. Carried on the wire, unused here.
    #[serde(default, deserialize_with = "null_as_default")]
    pub delay: i64,
}

/// JSON body returned by the compile endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompileResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: String,
    /// `null` or absent when compilation failed
    #[serde(default)]
    pub events: Option<Vec<CompileEvent>>,
}

impl CompileResponse {
    /// Collapse the event sequence into per-stream buffers.
    ///
    /// A non-empty `errors` field wins and no events are looked at. Otherwise
    /// messages are appended verbatim in arrival order; kinds other than
    /// stdout/stderr are dropped.
    pub fn aggregate(self) -> CompileResult {
        if !self.errors.is_empty() {
            return CompileResult::compile_error(self.errors);
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut dropped = 0usize;

        for event in self.events.unwrap_or_default() {
            match event.kind {
                EventKind::Stdout => stdout.push_str(&event.message),
                EventKind::Stderr => stderr.push_str(&event.message),
                EventKind::Other => dropped += 1,
            }
        }

        if dropped > 0 {
            log::debug!("Ignored {} compile events of unknown kind", dropped);
        }

        CompileResult {
            errors: String::new(),
            stdout,
            stderr,
        }
    }
}

const RESPONSE_FIELDS: &[&str] = &["Errors", "Events"];
const EVENT_FIELDS: &[&str] = &["Message", "Kind", "Delay"];

/// Decode a raw compile endpoint body.
///
/// Field names match case-insensitively and `null` values decode to the
/// field's empty value, the same leniency the playground's own clients get
/// from Go's `encoding/json`.
pub fn decode_response(body: &[u8]) -> Result<CompileResponse> {
    let raw: Value = serde_json::from_slice(body).map_err(PlaygroundError::Decode)?;
    serde_json::from_value(normalize_response(raw)).map_err(PlaygroundError::Decode)
}

fn normalize_response(raw: Value) -> Value {
    let mut response = canonicalize_keys(raw, RESPONSE_FIELDS);
    if let Some(Value::Array(events)) = response.get_mut("Events") {
        for event in events.iter_mut() {
            *event = canonicalize_keys(event.take(), EVENT_FIELDS);
        }
    }
    response
}

/// Rename object keys that differ from a known field only by ASCII case.
/// `null` becomes an empty object; other non-objects pass through untouched.
fn canonicalize_keys(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = fields
                        .iter()
                        .find(|field| field.eq_ignore_ascii_case(&key))
                        .map_or(key, |field| field.to_string());
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
