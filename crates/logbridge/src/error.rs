//! Logging error types.

use thiserror::Error;

/// Errors that can occur while parsing levels or setting up a logger.
///
/// Emitting a record never produces one of these; only level parsing,
/// option application and configuration loading do.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The string is neither a level name nor an integer.
    #[error("unknown level string: '{0}', defaulting to no level")]
    UnknownLevel(String),

    /// The integer does not fit a signed byte.
    #[error("out-of-bounds level: '{0}', defaulting to no level")]
    LevelOutOfBounds(i64),

    /// The level has no counterpart in the underlying engine.
    #[error("unknown level: '{0}'")]
    UnmappedLevel(i8),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Failed to parse a TOML configuration.
    #[error("failed to parse logging config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Environment variable error.
    #[error("environment variable '{var_name}': {message}")]
    EnvError {
        /// Name of the environment variable.
        var_name: String,
        /// Error description.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The logger has already been set up.
    #[error("logger is already initialized")]
    AlreadyInitialized,

    /// More than one option failed to apply.
    #[error("{}", join_messages(.0))]
    Multiple(Vec<LoggingError>),
}

impl LoggingError {
    /// Fold a list of failures into a single error.
    ///
    /// Returns `None` for an empty list and the error itself for a
    /// single-element list.
    #[must_use]
    pub fn join(mut errors: Vec<LoggingError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    /// Whether this error came from level parsing.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::UnknownLevel(_) | Self::LevelOutOfBounds(_))
    }
}

fn join_messages(errors: &[LoggingError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type for logging operations.
pub type LoggingResult<T> = Result<T, LoggingError>;
