//! Logger construction and record emission.

use std::io::Write;

use serde_json::{Map, Value};
use tracing::Dispatch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::{LoggingError, LoggingResult};
use crate::event::Event;
use crate::hook::TracingIdHook;
use crate::level::Level;
use crate::option::LoggerOption;
use crate::sink::{self, FileLogConfig, LayerSettings, LogFormat, SharedOutput};

/// Target every record is emitted with.
pub const TARGET: &str = "logbridge";

/// Accumulates options before a [`Logger`] is built.
#[derive(Debug)]
pub struct LoggerBuilder {
    level: Level,
    writer: Option<BoxMakeWriter>,
    output: Option<SharedOutput>,
    file: FileLogConfig,
    format: LogFormat,
    timestamps: bool,
    ansi: bool,
    hook: Option<TracingIdHook>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: Level::TRACE,
            writer: None,
            output: None,
            file: FileLogConfig::default(),
            format: LogFormat::Json,
            timestamps: true,
            ansi: false,
            hook: None,
        }
    }
}

impl LoggerBuilder {
    /// Create a builder with the defaults: trace, JSON to stderr, timestamps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every option in order.
    ///
    /// Every option runs even if an earlier one failed.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or [`LoggingError::Multiple`] if more
    /// than one option failed.
    pub fn apply<I>(&mut self, options: I) -> LoggingResult<()>
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut errors = Vec::new();
        for option in options {
            if let Err(e) = option.apply(self) {
                errors.push(e);
            }
        }
        LoggingError::join(errors).map_or(Ok(()), Err)
    }

    /// Build the logger.
    #[must_use]
    pub fn build(self) -> Logger {
        let settings = LayerSettings {
            format: self.format,
            timestamps: self.timestamps,
            ansi: self.ansi,
        };
        let writer = self
            .writer
            .unwrap_or_else(|| BoxMakeWriter::new(std::io::stderr));

        Logger {
            level: self.level,
            dispatch: sink::build_dispatch(settings, writer),
            output: self.output,
            hook: self.hook,
        }
    }

    /// The minimum level configured so far.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The file settings configured so far.
    #[must_use]
    pub fn file_config(&self) -> &FileLogConfig {
        &self.file
    }

    /// Set the minimum level without validation.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    /// Replace the writer.
    pub fn set_writer(&mut self, writer: BoxMakeWriter) {
        self.writer = Some(writer);
        self.output = None;
    }

    pub(crate) fn set_output(&mut self, output: SharedOutput) {
        self.writer = Some(BoxMakeWriter::new(output.clone()));
        self.output = Some(output);
    }

    /// Replace the file settings.
    pub fn set_file_config(&mut self, file: FileLogConfig) {
        self.file = file;
    }

    /// Set the record format.
    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Include or omit timestamps.
    pub fn set_timestamps(&mut self, enabled: bool) {
        self.timestamps = enabled;
    }

    /// Enable or disable ANSI colors.
    pub fn set_ansi(&mut self, enabled: bool) {
        self.ansi = enabled;
    }

    /// Register the tracing-ID hook.
    pub fn set_hook(&mut self, hook: TracingIdHook) {
        self.hook = Some(hook);
    }
}

/// A configured logger.
///
/// Records are emitted on the logger's own `tracing` dispatch, never on the
/// process-global subscriber, so several loggers can coexist.
#[derive(Debug)]
pub struct Logger {
    level: Level,
    dispatch: Dispatch,
    output: Option<SharedOutput>,
    hook: Option<TracingIdHook>,
}

impl Default for Logger {
    fn default() -> Self {
        LoggerBuilder::new().build()
    }
}

impl Logger {
    /// Start building a logger.
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a logger from options.
    ///
    /// # Errors
    ///
    /// Returns the aggregated option failures. Use [`LoggerBuilder::apply`]
    /// directly to keep the partially configured logger.
    pub fn with_options<I>(options: I) -> LoggingResult<Self>
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut builder = LoggerBuilder::new();
        builder.apply(options)?;
        Ok(builder.build())
    }

    /// The minimum level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The registered tracing-ID hook.
    #[must_use]
    pub fn hook(&self) -> Option<&TracingIdHook> {
        self.hook.as_ref()
    }

    /// Flush a sink registered with
    /// [`with_output`](crate::with_output).
    ///
    /// # Errors
    ///
    /// Returns the sink's flush error.
    pub fn flush(&self) -> LoggingResult<()> {
        if let Some(mut output) = self.output.clone() {
            output.flush()?;
        }
        Ok(())
    }

    /// Whether records at `level` are emitted.
    ///
    /// Nothing is emitted at [`Level::DISABLED`] or below a disabled
    /// minimum.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level != Level::DISABLED && self.level != Level::DISABLED && level >= self.level
    }

    /// Open a trace event.
    #[must_use]
    pub fn trace(&self) -> Event<'_> {
        Event::new(self, Level::TRACE)
    }

    /// Open a debug event.
    #[must_use]
    pub fn debug(&self) -> Event<'_> {
        Event::new(self, Level::DEBUG)
    }

    /// Open an info event.
    #[must_use]
    pub fn info(&self) -> Event<'_> {
        Event::new(self, Level::INFO)
    }

    /// Open a warn event.
    #[must_use]
    pub fn warn(&self) -> Event<'_> {
        Event::new(self, Level::WARN)
    }

    /// Open an error event.
    #[must_use]
    pub fn error(&self) -> Event<'_> {
        Event::new(self, Level::ERROR)
    }

    /// Open a fatal event. Finalizing it exits the process with status 1.
    #[must_use]
    pub fn fatal(&self) -> Event<'_> {
        Event::new(self, Level::FATAL)
    }

    /// Open a panic event. Finalizing it panics with the message.
    #[must_use]
    pub fn panic(&self) -> Event<'_> {
        Event::new(self, Level::PANIC)
    }

    /// Open an event without a level.
    #[must_use]
    pub fn log(&self) -> Event<'_> {
        Event::new(self, Level::NO_LEVEL)
    }

    /// Open an event at an arbitrary level. Fatal and panic levels keep
    /// their side effects.
    #[must_use]
    pub fn at_level(&self, level: Level) -> Event<'_> {
        Event::new(self, level)
    }

    pub(crate) fn emit(&self, level: Level, fields: &Map<String, Value>, message: &str) {
        let severity = level.to_string();
        let severity = Some(severity.as_str()).filter(|s| !s.is_empty());
        let fields = if fields.is_empty() {
            None
        } else {
            serde_json::to_string(fields).ok()
        };
        let fields = fields.as_deref();

        tracing::dispatcher::with_default(&self.dispatch, || match level.emit_level() {
            tracing::Level::TRACE => {
                tracing::trace!(target: TARGET, severity, fields, "{message}");
            },
            tracing::Level::DEBUG => {
                tracing::debug!(target: TARGET, severity, fields, "{message}");
            },
            tracing::Level::INFO => {
                tracing::info!(target: TARGET, severity, fields, "{message}");
            },
            tracing::Level::WARN => {
                tracing::warn!(target: TARGET, severity, fields, "{message}");
            },
            _ => {
                tracing::error!(target: TARGET, severity, fields, "{message}");
            },
        });
    }
}
