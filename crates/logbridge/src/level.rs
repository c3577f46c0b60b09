//! Severity levels.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing_subscriber::filter::LevelFilter;

use crate::error::{LoggingError, LoggingResult};

/// Severity of a log record.
///
/// The named levels have fixed codes; every other `i8` is a custom level
/// that renders as its decimal value. Levels order by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i8);

impl Level {
    /// Trace level.
    pub const TRACE: Self = Self(-1);
    /// Debug level.
    pub const DEBUG: Self = Self(0);
    /// Info level.
    pub const INFO: Self = Self(1);
    /// Warn level.
    pub const WARN: Self = Self(2);
    /// Error level.
    pub const ERROR: Self = Self(3);
    /// Fatal level. Finalizing a fatal event exits the process.
    pub const FATAL: Self = Self(4);
    /// Panic level. Finalizing a panic event panics.
    pub const PANIC: Self = Self(5);
    /// Absent level.
    pub const NO_LEVEL: Self = Self(6);
    /// Disables the logger when used as a minimum.
    pub const DISABLED: Self = Self(7);

    const NAMED: [Self; 9] = [
        Self::TRACE,
        Self::DEBUG,
        Self::INFO,
        Self::WARN,
        Self::ERROR,
        Self::FATAL,
        Self::PANIC,
        Self::NO_LEVEL,
        Self::DISABLED,
    ];

    /// Build a level from its raw code.
    #[must_use]
    pub const fn new(code: i8) -> Self {
        Self(code)
    }

    /// The raw code.
    #[must_use]
    pub const fn code(self) -> i8 {
        self.0
    }

    /// Canonical name of a named level, `None` for custom levels.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            -1 => Some("trace"),
            0 => Some("debug"),
            1 => Some("info"),
            2 => Some("warn"),
            3 => Some("error"),
            4 => Some("fatal"),
            5 => Some("panic"),
            6 => Some(""),
            7 => Some("disabled"),
            _ => None,
        }
    }

    /// Whether this is one of the nine named levels.
    #[must_use]
    pub const fn is_named(self) -> bool {
        self.name().is_some()
    }

    /// Parse a level from text.
    ///
    /// Names match case-insensitively and the empty string is
    /// [`Level::NO_LEVEL`]. Anything else must be a decimal integer in
    /// `[-128, 127]`.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::UnknownLevel`] for text that is neither a
    /// name nor an integer, and [`LoggingError::LevelOutOfBounds`] for an
    /// integer outside the signed-byte range. Callers that want the
    /// no-level fallback use [`Level::parse_lossy`].
    pub fn parse(text: &str) -> LoggingResult<Self> {
        if let Some(level) = Self::NAMED
            .into_iter()
            .find(|level| level.name().is_some_and(|name| name.eq_ignore_ascii_case(text)))
        {
            return Ok(level);
        }

        let value: i64 = text
            .parse()
            .map_err(|_| LoggingError::UnknownLevel(text.to_string()))?;
        Self::try_from(value)
    }

    /// Parse a level, falling back to [`Level::NO_LEVEL`] on error.
    #[must_use]
    pub fn parse_lossy(text: &str) -> Self {
        Self::parse(text).unwrap_or(Self::NO_LEVEL)
    }

    /// Map this level onto the engine's level filter.
    ///
    /// Error, fatal and panic share the engine's error level. No level
    /// and custom levels below trace filter nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::UnmappedLevel`] for custom levels above trace.
    pub fn to_filter(self) -> LoggingResult<LevelFilter> {
        match self {
            Self::TRACE | Self::NO_LEVEL => Ok(LevelFilter::TRACE),
            Self::DEBUG => Ok(LevelFilter::DEBUG),
            Self::INFO => Ok(LevelFilter::INFO),
            Self::WARN => Ok(LevelFilter::WARN),
            Self::ERROR | Self::FATAL | Self::PANIC => Ok(LevelFilter::ERROR),
            Self::DISABLED => Ok(LevelFilter::OFF),
            Self(code) if code < Self::TRACE.0 => Ok(LevelFilter::TRACE),
            Self(code) => Err(LoggingError::UnmappedLevel(code)),
        }
    }

    /// Engine level a record of this severity is emitted at.
    pub(crate) fn emit_level(self) -> tracing::Level {
        match self.0 {
            i8::MIN..=-1 => tracing::Level::TRACE,
            0 => tracing::Level::DEBUG,
            1 | 6 => tracing::Level::INFO,
            2 => tracing::Level::WARN,
            _ => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for Level {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i8> for Level {
    fn from(code: i8) -> Self {
        Self(code)
    }
}

impl TryFrom<i64> for Level {
    type Error = LoggingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        i8::try_from(value)
            .map(Self)
            .map_err(|_| LoggingError::LevelOutOfBounds(value))
    }
}

impl TryFrom<i32> for Level {
    type Error = LoggingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LevelVisitor)
    }
}

struct LevelVisitor;

impl Visitor<'_> for LevelVisitor {
    type Value = Level;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a level name or an integer in [-128, 127]")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Level, E> {
        Level::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Level, E> {
        Level::try_from(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Level, E> {
        let v = i64::try_from(v).unwrap_or(i64::MAX);
        Level::try_from(v).map_err(E::custom)
    }
}
