//! Fluent per-event field builder.

use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::level::Level;
use crate::logger::Logger;

/// Field name used by [`Event::err`].
pub const ERROR_FIELD: &str = "error";

static BACKGROUND: LazyLock<RequestContext> = LazyLock::new(RequestContext::background);

/// A record being assembled.
///
/// Attach fields with the chainable methods, then finalize with exactly
/// one of [`msg`](Self::msg), [`msgf`](Self::msgf) or [`send`](Self::send).
/// Finalizers consume the event, so an event cannot be finalized twice or
/// receive fields after it was written. An event is owned by one call site
/// and is not meant to be shared between threads.
///
/// When the logger does not emit the event's level, every method is a
/// cheap no-op and nothing is written.
#[must_use = "an event is only written when finalized with `msg`, `msgf` or `send`"]
pub struct Event<'a> {
    logger: &'a Logger,
    level: Level,
    fields: Option<Map<String, Value>>,
    ctx: Option<RequestContext>,
}

impl<'a> Event<'a> {
    pub(crate) fn new(logger: &'a Logger, level: Level) -> Self {
        let fields = logger.enabled(level).then(Map::new);
        Self {
            logger,
            level,
            fields,
            ctx: None,
        }
    }

    /// The event's level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether the event will be written.
    pub fn enabled(&self) -> bool {
        self.fields.is_some()
    }

    /// Turn the event into a no-op.
    pub fn discard(mut self) -> Self {
        self.fields = None;
        self
    }

    fn field(mut self, key: &str, value: impl FnOnce() -> Value) -> Self {
        if let Some(fields) = self.fields.as_mut() {
            fields.insert(key.to_string(), value());
        }
        self
    }

    /// Add a string field.
    pub fn str(self, key: &str, val: &str) -> Self {
        self.field(key, || Value::from(val))
    }

    /// Add an integer field.
    pub fn int(self, key: &str, val: i32) -> Self {
        self.field(key, || Value::from(val))
    }

    /// Add a 64-bit integer field.
    pub fn int64(self, key: &str, val: i64) -> Self {
        self.field(key, || Value::from(val))
    }

    /// Add an unsigned 64-bit integer field.
    pub fn uint64(self, key: &str, val: u64) -> Self {
        self.field(key, || Value::from(val))
    }

    /// Add a float field. Non-finite values are written as `null`.
    pub fn float64(self, key: &str, val: f64) -> Self {
        self.field(key, || Value::from(val))
    }

    /// Add a boolean field.
    pub fn bool(self, key: &str, val: bool) -> Self {
        self.field(key, || Value::from(val))
    }

    /// Add a field of any serializable type.
    ///
    /// If serialization fails the error text is written instead.
    pub fn any<T>(self, key: &str, val: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.field(key, || {
            serde_json::to_value(val).unwrap_or_else(|e| Value::String(e.to_string()))
        })
    }

    /// Add the error's message under the `error` field.
    pub fn err<E>(self, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        self.field(ERROR_FIELD, || Value::String(err.to_string()))
    }

    /// Attach the request context the tracing-ID hook reads.
    pub fn ctx(mut self, ctx: &RequestContext) -> Self {
        if self.fields.is_some() {
            self.ctx = Some(ctx.clone());
        }
        self
    }

    /// Finalize the event with a message.
    pub fn msg(self, message: impl AsRef<str>) {
        self.finish(message.as_ref());
    }

    /// Finalize the event with a formatted message.
    ///
    /// The message is only formatted when it is needed.
    pub fn msgf(self, args: fmt::Arguments<'_>) {
        if self.enabled() || self.level == Level::PANIC {
            let message = args.to_string();
            self.finish(&message);
        } else {
            self.finish("");
        }
    }

    /// Finalize the event without a message.
    pub fn send(self) {
        self.finish("");
    }

    fn finish(mut self, message: &str) {
        if let Some(mut fields) = self.fields.take() {
            if let Some(hook) = self.logger.hook() {
                hook.run(self.ctx.as_ref().unwrap_or(&*BACKGROUND), &mut fields);
            }
            self.logger.emit(self.level, &fields, message);
        }

        match self.level {
            Level::FATAL => {
                let _ = self.logger.flush();
                std::process::exit(1)
            },
            Level::PANIC => {
                let _ = self.logger.flush();
                panic!("{message}")
            },
            _ => {},
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .field("ctx", &self.ctx.as_ref().map(|ctx| ctx.request_id))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::TracingIdHook;
    use crate::option::{with_level, with_output, with_tracing_id_hook};
    use logbridge_test::SharedBuffer;
    use serde::Serializer;

    fn capture() -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_options([with_output(buffer.clone())]).unwrap();
        (logger, buffer)
    }

    fn capture_with_hook(hook: TracingIdHook) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger =
            Logger::with_options([with_output(buffer.clone()), with_tracing_id_hook(hook)])
                .unwrap();
        (logger, buffer)
    }

    #[derive(Debug)]
    struct Failure;

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection reset")
        }
    }

    impl std::error::Error for Failure {}

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[test]
    fn test_typed_fields() {
        let (logger, buffer) = capture();

        logger
            .info()
            .str("name", "disk")
            .int("count", -2)
            .int64("bytes", 1 << 40)
            .uint64("inode", u64::MAX)
            .float64("ratio", 0.5)
            .bool("mounted", true)
            .any("tags", &["a", "b"])
            .msg("checked");

        let record = buffer.records().remove(0);
        assert_eq!(record.field("name"), Some(&Value::from("disk")));
        assert_eq!(record.field("count"), Some(&Value::from(-2)));
        assert_eq!(record.field("bytes"), Some(&Value::from(1_i64 << 40)));
        assert_eq!(record.field("inode"), Some(&Value::from(u64::MAX)));
        assert_eq!(record.field("ratio"), Some(&Value::from(0.5)));
        assert_eq!(record.field("mounted"), Some(&Value::from(true)));
        assert_eq!(record.field("tags"), Some(&serde_json::json!(["a", "b"])));
    }

    #[test]
    fn test_err_field() {
        let (logger, buffer) = capture();

        logger.error().err(&Failure).msg("request failed");

        let record = buffer.records().remove(0);
        assert_eq!(record.field(ERROR_FIELD), Some(&Value::from("connection reset")));
    }

    #[test]
    fn test_any_records_serialization_error() {
        let (logger, buffer) = capture();

        logger.info().any("payload", &Unserializable).msg("odd payload");

        let record = buffer.records().remove(0);
        assert_eq!(record.field("payload"), Some(&Value::from("refused")));
    }

    #[test]
    fn test_later_field_overwrites_key() {
        let (logger, buffer) = capture();

        logger.info().str("k", "first").str("k", "second").msg("dup");

        let record = buffer.records().remove(0);
        assert_eq!(record.field("k"), Some(&Value::from("second")));
    }

    #[test]
    fn test_msgf_and_send() {
        let (logger, buffer) = capture();

        logger.info().msgf(format_args!("{} + {}", 1, 2));
        logger.info().str("only", "fields").send();

        let records = buffer.records();
        assert_eq!(records[0].message(), Some("1 + 2"));
        assert_eq!(records[1].message(), Some(""));
        assert_eq!(records[1].field("only"), Some(&Value::from("fields")));
    }

    #[test]
    fn test_disabled_event_accepts_fields() {
        let buffer = SharedBuffer::new();
        let logger =
            Logger::with_options([with_output(buffer.clone()), with_level(Level::ERROR)]).unwrap();

        let event = logger.debug().str("k", "v").ctx(&RequestContext::new("t"));
        assert!(!event.enabled());
        assert_eq!(event.level(), Level::DEBUG);
        event.msg("never written");

        assert!(buffer.is_empty());
    }

    #[test]
    fn test_discard() {
        let (logger, buffer) = capture();

        let event = logger.info().str("k", "v").discard();
        assert!(!event.enabled());
        event.msg("gone");

        assert!(buffer.is_empty());
    }

    #[test]
    fn test_hook_injects_correlation_id() {
        let (logger, buffer) = capture_with_hook(TracingIdHook::correlation_id());
        let ctx = RequestContext::new("api").with_correlation_id("corr-7");

        logger.info().ctx(&ctx).str("path", "/health").msg("served");

        let record = buffer.records().remove(0);
        assert_eq!(record.message(), Some("served"));
        assert_eq!(record.field("tracing_id"), Some(&Value::from("corr-7")));
        assert_eq!(record.field("path"), Some(&Value::from("/health")));
    }

    #[test]
    fn test_hook_without_identifier_attaches_empty() {
        let (logger, buffer) = capture_with_hook(TracingIdHook::correlation_id());

        logger
            .warn()
            .ctx(&RequestContext::background())
            .msg("no id available");
        logger.warn().msg("no context at all");

        let records = buffer.records();
        assert_eq!(records.len(), 2);
        for (record, message) in records.iter().zip(["no id available", "no context at all"]) {
            assert_eq!(record.message(), Some(message));
            assert_eq!(record.field("tracing_id"), Some(&Value::from("")));
        }
    }

    #[test]
    fn test_hook_runs_once_per_emitted_event() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hook = TracingIdHook::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            "x".to_string()
        });

        let buffer = SharedBuffer::new();
        let logger = Logger::with_options([
            with_output(buffer.clone()),
            with_level(Level::INFO),
            with_tracing_id_hook(hook),
        ])
        .unwrap();

        logger.info().msg("one");
        logger.error().msg("two");
        logger.debug().msg("filtered");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(buffer.records().len(), 2);
    }

    #[test]
    fn test_panicking_hook_still_logs() {
        let (logger, buffer) = capture_with_hook(TracingIdHook::new(|_| panic!("hook bug")));

        logger.info().msg("survived");

        let record = buffer.records().remove(0);
        assert_eq!(record.message(), Some("survived"));
        assert_eq!(record.field("tracing_id"), Some(&Value::from("")));
    }

    #[test]
    #[should_panic(expected = "unrecoverable state")]
    fn test_panic_event_panics_after_writing() {
        let (logger, _buffer) = capture();
        logger.panic().str("k", "v").msg("unrecoverable state");
    }

    #[test]
    #[should_panic(expected = "filtered but fatal")]
    fn test_panic_event_panics_when_filtered() {
        let buffer = SharedBuffer::new();
        let logger =
            Logger::with_options([with_output(buffer), with_level(Level::DISABLED)]).unwrap();
        logger.panic().msgf(format_args!("filtered but {}", "fatal"));
    }
}
