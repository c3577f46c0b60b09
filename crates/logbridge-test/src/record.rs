//! Decoding of JSON log records.

use serde_json::{Map, Value};

/// Keys every record carries besides its structured fields.
const RECORD_KEYS: [&str; 5] = ["message", "level", "severity", "target", "timestamp"];

/// One JSON log line as written by a logbridge logger in JSON format.
///
/// Structured fields are top-level keys next to the record keys.
#[derive(Debug, Clone)]
pub struct Record {
    raw: Map<String, Value>,
}

impl Record {
    /// Parse a single line. Returns `None` if it is not a JSON object.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match serde_json::from_str(line).ok()? {
            Value::Object(raw) => Some(Self { raw }),
            _ => None,
        }
    }

    /// The record message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.raw.get("message").and_then(Value::as_str)
    }

    /// The facade severity name (`"warn"`, `"fatal"`, `"7"`, ...).
    #[must_use]
    pub fn severity(&self) -> Option<&str> {
        self.raw.get("severity").and_then(Value::as_str)
    }

    /// The engine level name (`"INFO"`, `"ERROR"`, ...).
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.raw.get("level").and_then(Value::as_str)
    }

    /// Whether the record carries a timestamp.
    #[must_use]
    pub fn has_timestamp(&self) -> bool {
        self.raw.contains_key("timestamp")
    }

    /// A structured field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        if RECORD_KEYS.contains(&key) {
            None
        } else {
            self.raw.get(key)
        }
    }

    /// All structured fields, without the record keys.
    #[must_use]
    pub fn fields(&self) -> Map<String, Value> {
        self.raw
            .iter()
            .filter(|(key, _)| !RECORD_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// A top-level key of the raw record.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}
