//! JSON record formatting.
//!
//! Structured fields travel through the engine as one encoded `fields`
//! value. The JSON format decodes that value and writes each field as a
//! typed top-level key next to the message.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub(crate) mod keys {
    pub(crate) const MESSAGE: &str = "message";
    pub(crate) const LEVEL: &str = "level";
    pub(crate) const SEVERITY: &str = "severity";
    pub(crate) const TARGET: &str = "target";
    pub(crate) const TIMESTAMP: &str = "timestamp";
    pub(crate) const FIELDS: &str = "fields";

    /// Keys owned by the record itself. A structured field with one of
    /// these names does not replace it.
    pub(crate) const IMPLICIT: [&str; 5] = [MESSAGE, LEVEL, SEVERITY, TARGET, TIMESTAMP];
}

/// Writes one flat JSON object per record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JsonRecord {
    timestamps: bool,
}

impl JsonRecord {
    pub(crate) fn new(timestamps: bool) -> Self {
        Self { timestamps }
    }

    fn to_object(self, event: &Event<'_>) -> Map<String, Value> {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut record = visitor.record;
        if self.timestamps {
            record.insert(
                keys::TIMESTAMP.to_string(),
                Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
            );
        }
        record.insert(
            keys::LEVEL.to_string(),
            Value::from(event.metadata().level().as_str()),
        );
        record.insert(
            keys::TARGET.to_string(),
            Value::from(event.metadata().target()),
        );

        for (key, value) in visitor.fields {
            if !keys::IMPLICIT.contains(&key.as_str()) {
                record.entry(key).or_insert(value);
            }
        }
        record
    }
}

impl<S, N> FormatEvent<S, N> for JsonRecord
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let line = serde_json::to_string(&self.to_object(event)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

#[derive(Default)]
struct RecordVisitor {
    record: Map<String, Value>,
    fields: Map<String, Value>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == keys::FIELDS {
            match serde_json::from_str(value) {
                Ok(Value::Object(fields)) => self.fields = fields,
                _ => {
                    self.record
                        .insert(keys::FIELDS.to_string(), Value::from(value));
                },
            }
        } else {
            self.record
                .insert(field.name().to_string(), Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record
            .insert(field.name().to_string(), Value::from(format!("{value:?}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logbridge_test::SharedBuffer;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(timestamps: bool) -> (tracing::Dispatch, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let writer = buffer.clone();
        let layer = tracing_subscriber::fmt::layer()
            .event_format(JsonRecord::new(timestamps))
            .with_writer(move || writer.clone());
        let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(layer));
        (dispatch, buffer)
    }

    fn line(buffer: &SharedBuffer) -> Map<String, Value> {
        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        match serde_json::from_str(&lines[0]).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_fields_are_flattened_and_typed() {
        let (dispatch, buffer) = capture(false);
        let fields = r#"{"attempt":3,"user":"bob","tags":["a"]}"#;

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(target: "svc", severity = "info", fields, "signed in");
        });

        let record = line(&buffer);
        assert_eq!(record["message"], Value::from("signed in"));
        assert_eq!(record["level"], Value::from("INFO"));
        assert_eq!(record["target"], Value::from("svc"));
        assert_eq!(record["severity"], Value::from("info"));
        assert_eq!(record["attempt"], Value::from(3));
        assert_eq!(record["user"], Value::from("bob"));
        assert_eq!(record["tags"], serde_json::json!(["a"]));
        assert!(!record.contains_key("fields"));
        assert!(!record.contains_key("timestamp"));
    }

    #[test]
    fn test_implicit_keys_win_over_fields() {
        let (dispatch, buffer) = capture(true);
        let fields = r#"{"message":"spoofed","level":"none","extra":true}"#;

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!(fields, "real message");
        });

        let record = line(&buffer);
        assert_eq!(record["message"], Value::from("real message"));
        assert_eq!(record["level"], Value::from("WARN"));
        assert_eq!(record["extra"], Value::from(true));
        assert!(record["timestamp"].is_string());
    }

    #[test]
    fn test_undecodable_fields_kept_as_text() {
        let (dispatch, buffer) = capture(false);
        let fields = "not an object";

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!(fields, count = 2_u64, "odd");
        });

        let record = line(&buffer);
        assert_eq!(record["fields"], Value::from("not an object"));
        assert_eq!(record["count"], Value::from(2));
    }
}
