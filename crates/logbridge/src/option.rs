//! Functional options applied when a logger is set up.

use std::fmt;
use std::io;

use crate::error::LoggingResult;
use crate::hook::TracingIdHook;
use crate::level::Level;
use crate::logger::LoggerBuilder;
use crate::sink::{self, FileLogConfig, LogFormat, LogTarget};

type ApplyFn = dyn FnOnce(&mut LoggerBuilder) -> LoggingResult<()> + Send;

/// One configuration step applied to a [`LoggerBuilder`].
///
/// Options apply in order; a failing option leaves the builder as it was
/// and does not stop the options after it.
pub struct LoggerOption {
    name: &'static str,
    apply: Box<ApplyFn>,
}

impl LoggerOption {
    /// Wrap a custom configuration step.
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: FnOnce(&mut LoggerBuilder) -> LoggingResult<()> + Send + 'static,
    {
        Self {
            name,
            apply: Box::new(apply),
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn apply(self, builder: &mut LoggerBuilder) -> LoggingResult<()> {
        (self.apply)(builder)
    }
}

impl fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOption")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Write records to an arbitrary byte sink.
pub fn with_output<W>(output: W) -> LoggerOption
where
    W: io::Write + Send + 'static,
{
    LoggerOption::new("output", move |builder| {
        builder.set_output(sink::SharedOutput::new(output));
        Ok(())
    })
}

/// Set the minimum level.
///
/// Custom levels below trace are accepted. Fails with
/// [`LoggingError::UnmappedLevel`](crate::LoggingError::UnmappedLevel) for
/// custom levels above trace; the previous minimum is kept.
pub fn with_level(level: Level) -> LoggerOption {
    LoggerOption::new("level", move |builder| {
        level.to_filter()?;
        builder.set_level(level);
        Ok(())
    })
}

/// Write records to stdout, stderr or rolling files.
///
/// File targets use the file settings applied so far.
pub fn with_target(target: LogTarget) -> LoggerOption {
    LoggerOption::new("target", move |builder| {
        let writer = sink::target_writer(&target, builder.file_config())?;
        builder.set_writer(writer);
        Ok(())
    })
}

/// Set prefix, rotation and retention for file targets.
pub fn with_file_config(file: FileLogConfig) -> LoggerOption {
    LoggerOption::new("file", move |builder| {
        builder.set_file_config(file);
        Ok(())
    })
}

/// Set the record format.
pub fn with_format(format: LogFormat) -> LoggerOption {
    LoggerOption::new("format", move |builder| {
        builder.set_format(format);
        Ok(())
    })
}

/// Include or omit timestamps.
pub fn with_timestamps(enabled: bool) -> LoggerOption {
    LoggerOption::new("timestamps", move |builder| {
        builder.set_timestamps(enabled);
        Ok(())
    })
}

/// Enable or disable ANSI colors in text formats.
pub fn with_ansi(enabled: bool) -> LoggerOption {
    LoggerOption::new("ansi", move |builder| {
        builder.set_ansi(enabled);
        Ok(())
    })
}

/// Register the tracing-ID hook.
pub fn with_tracing_id_hook(hook: TracingIdHook) -> LoggerOption {
    LoggerOption::new("tracing_id_hook", move |builder| {
        builder.set_hook(hook);
        Ok(())
    })
}
