//! Output targets and record formats.
//!
//! The facade does not format or write records itself: every logger owns a
//! `tracing` dispatch built here from a `tracing-subscriber` fmt layer and a
//! writer.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, MakeWriter, writer::BoxMakeWriter},
    layer::SubscriberExt,
};

use crate::error::{LoggingError, LoggingResult};
use crate::format::JsonRecord;

/// File rotation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    /// Rotate daily.
    #[default]
    Daily,
    /// Rotate hourly.
    Hourly,
    /// Rotate every minute (for testing).
    Minutely,
    /// Never rotate.
    Never,
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Daily => Rotation::DAILY,
            FileRotation::Hourly => Rotation::HOURLY,
            FileRotation::Minutely => Rotation::MINUTELY,
            FileRotation::Never => Rotation::NEVER,
        }
    }
}

/// Record format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line (default).
    #[default]
    Json,
    /// Human-readable multi-line format.
    Pretty,
    /// Compact single-line format.
    Compact,
    /// Full single-line format.
    Full,
}

/// Log output target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to stdout.
    Stdout,
    /// Log to stderr.
    #[default]
    Stderr,
    /// Log to rolling files in a directory.
    File(PathBuf),
}

/// File logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogConfig {
    /// File name prefix (e.g., "app" produces "app.2024-01-15.log").
    #[serde(default = "default_file_prefix")]
    pub prefix: String,
    /// Rotation strategy.
    #[serde(default)]
    pub rotation: FileRotation,
    /// Maximum number of log files to keep (0 = unlimited).
    #[serde(default)]
    pub max_files: usize,
}

fn default_file_prefix() -> String {
    "logbridge".to_string()
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            prefix: default_file_prefix(),
            rotation: FileRotation::default(),
            max_files: 0,
        }
    }
}

/// A caller-supplied byte sink shared between the engine and the logger.
///
/// The logger keeps a handle so buffered output can be flushed before the
/// process exits.
#[derive(Clone)]
pub(crate) struct SharedOutput {
    inner: Arc<Mutex<dyn io::Write + Send>>,
}

impl SharedOutput {
    pub(crate) fn new<W>(output: W) -> Self
    where
        W: io::Write + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(output)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, dyn io::Write + Send + 'static> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SharedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOutput").finish_non_exhaustive()
    }
}

impl io::Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for SharedOutput {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Writer for a target. File targets create their directory.
pub(crate) fn target_writer(
    target: &LogTarget,
    file: &FileLogConfig,
) -> LoggingResult<BoxMakeWriter> {
    match target {
        LogTarget::Stdout => Ok(BoxMakeWriter::new(io::stdout)),
        LogTarget::Stderr => Ok(BoxMakeWriter::new(io::stderr)),
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                LoggingError::ConfigError(format!("failed to create log directory: {e}"))
            })?;

            let mut builder = RollingFileAppender::builder()
                .rotation(file.rotation.into())
                .filename_prefix(file.prefix.clone())
                .filename_suffix("log");
            if file.max_files > 0 {
                builder = builder.max_log_files(file.max_files);
            }

            let appender = builder.build(dir).map_err(|e| {
                LoggingError::ConfigError(format!("failed to create log file appender: {e}"))
            })?;
            Ok(BoxMakeWriter::new(appender))
        },
    }
}

/// Layer settings shared by every format.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayerSettings {
    pub(crate) format: LogFormat,
    pub(crate) timestamps: bool,
    pub(crate) ansi: bool,
}

/// Build the dispatch records are emitted on.
pub(crate) fn build_dispatch(settings: LayerSettings, writer: BoxMakeWriter) -> Dispatch {
    match settings.format {
        LogFormat::Json => json_dispatch(settings, writer),
        LogFormat::Pretty => pretty_dispatch(settings, writer),
        LogFormat::Compact => compact_dispatch(settings, writer),
        LogFormat::Full => full_dispatch(settings, writer),
    }
}

fn json_dispatch<W>(settings: LayerSettings, writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .event_format(JsonRecord::new(settings.timestamps))
        .with_writer(writer);

    Dispatch::new(tracing_subscriber::registry().with(layer))
}

fn pretty_dispatch<W>(settings: LayerSettings, writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .pretty()
        .with_writer(writer)
        .with_ansi(settings.ansi);

    if settings.timestamps {
        Dispatch::new(tracing_subscriber::registry().with(layer))
    } else {
        Dispatch::new(tracing_subscriber::registry().with(layer.without_time()))
    }
}

fn compact_dispatch<W>(settings: LayerSettings, writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .compact()
        .with_writer(writer)
        .with_ansi(settings.ansi);

    if settings.timestamps {
        Dispatch::new(tracing_subscriber::registry().with(layer))
    } else {
        Dispatch::new(tracing_subscriber::registry().with(layer.without_time()))
    }
}

fn full_dispatch<W>(settings: LayerSettings, writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(settings.ansi);

    if settings.timestamps {
        Dispatch::new(tracing_subscriber::registry().with(layer))
    } else {
        Dispatch::new(tracing_subscriber::registry().with(layer.without_time()))
    }
}
