//! File and environment configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::context::RequestContext;
use crate::error::{LoggingError, LoggingResult};
use crate::hook::{DEFAULT_TRACING_ID_FIELD, TracingIdHook};
use crate::level::Level;
use crate::option::{
    LoggerOption, with_ansi, with_file_config, with_format, with_level, with_target,
    with_timestamps, with_tracing_id_hook,
};
use crate::sink::{FileLogConfig, LogFormat, LogTarget};

/// Environment variable overriding [`LogConfig::level`].
pub const ENV_LOG_LEVEL: &str = "LOGBRIDGE_LOG_LEVEL";
/// Environment variable overriding [`LogConfig::format`].
pub const ENV_LOG_FORMAT: &str = "LOGBRIDGE_LOG_FORMAT";
/// Environment variable overriding [`LogConfig::timestamps`].
pub const ENV_LOG_TIMESTAMPS: &str = "LOGBRIDGE_LOG_TIMESTAMPS";

/// Logging configuration, typically the `[logging]` table of a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level.
    #[serde(default = "default_level")]
    pub level: Level,
    /// Record format.
    #[serde(default)]
    pub format: LogFormat,
    /// Output target.
    #[serde(default)]
    pub target: LogTarget,
    /// File settings (used when target is a file).
    #[serde(default)]
    pub file: FileLogConfig,
    /// Whether to include timestamps.
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Whether to use ANSI colors in text formats.
    #[serde(default)]
    pub ansi: bool,
    /// Field the tracing-ID hook writes.
    #[serde(default = "default_tracing_id_field")]
    pub tracing_id_field: String,
}

fn default_level() -> Level {
    Level::INFO
}

fn default_true() -> bool {
    true
}

fn default_tracing_id_field() -> String {
    DEFAULT_TRACING_ID_FIELD.to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file: FileLogConfig::default(),
            timestamps: true,
            ansi: false,
            tracing_id_field: default_tracing_id_field(),
        }
    }
}

impl LogConfig {
    /// Create a config with the given minimum level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Parse a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::ParseError`] for malformed TOML or an invalid
    /// level.
    pub fn from_toml_str(text: &str) -> LoggingResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::IoError`] if the file cannot be read and
    /// [`LoggingError::ParseError`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> LoggingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the record format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Log to rolling files in `directory` with the given file prefix.
    #[must_use]
    pub fn with_file_logging(
        mut self,
        directory: impl Into<std::path::PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        self.target = LogTarget::File(directory.into());
        self.file.prefix = prefix.into();
        self.ansi = false;
        self
    }

    /// Disable timestamps.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`LogConfig::apply_env_with`].
    pub fn apply_env(&mut self) -> LoggingResult<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::EnvError`] for the first value that does not
    /// parse; earlier overrides stay applied.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> LoggingResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.level = Level::parse(value.trim()).map_err(|e| env_error(ENV_LOG_LEVEL, e))?;
        }

        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.format = match value.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                "compact" => LogFormat::Compact,
                "full" => LogFormat::Full,
                other => {
                    return Err(env_error(ENV_LOG_FORMAT, format!("unknown format '{other}'")));
                },
            };
        }

        if let Some(value) = lookup(ENV_LOG_TIMESTAMPS) {
            self.timestamps = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(env_error(
                        ENV_LOG_TIMESTAMPS,
                        format!("expected a boolean, got '{other}'"),
                    ));
                },
            };
        }

        Ok(())
    }

    /// Options that set up a logger as described by this config.
    ///
    /// No tracing-ID hook is registered.
    #[must_use]
    pub fn into_options(self) -> Vec<LoggerOption> {
        vec![
            with_level(self.level),
            with_format(self.format),
            with_timestamps(self.timestamps),
            with_ansi(self.ansi),
            with_file_config(self.file),
            with_target(self.target),
        ]
    }

    /// Options as [`into_options`](Self::into_options), plus a tracing-ID
    /// hook writing to [`tracing_id_field`](Self::tracing_id_field).
    #[must_use]
    pub fn into_options_with_hook<F>(self, tracing_id: F) -> Vec<LoggerOption>
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        let hook = TracingIdHook::new(tracing_id).with_field_name(self.tracing_id_field.clone());
        let mut options = self.into_options();
        options.push(with_tracing_id_hook(hook));
        options
    }
}

fn env_error(var_name: &str, message: impl ToString) -> LoggingError {
    LoggingError::EnvError {
        var_name: var_name.to_string(),
        message: message.to_string(),
    }
}
