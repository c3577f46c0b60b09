//! Logbridge - A structured logging facade over the tracing ecosystem.
//!
//! This crate provides:
//! - A severity [`Level`] model with text parsing and serialization
//! - A process-wide logger configured once through functional options
//! - A fluent [`Event`] builder for typed structured fields
//! - A [`TracingIdHook`] that stamps records with a correlation ID taken
//!   from a [`RequestContext`]
//!
//! Formatting and writing are delegated to `tracing-subscriber` and
//! `tracing-appender`.
//!
//! # Example
//!
//! ```rust,no_run
//! use logbridge::{
//!     Level, RequestContext, TracingIdHook, setup_logger, with_level, with_output,
//!     with_tracing_id_hook,
//! };
//!
//! # fn main() -> Result<(), logbridge::LoggingError> {
//! // Set up the global logger once
//! setup_logger([
//!     with_output(std::io::stdout()),
//!     with_level(Level::parse("info")?),
//!     with_tracing_id_hook(TracingIdHook::correlation_id()),
//! ])?;
//!
//! // Log with structured fields and a request context
//! let ctx = RequestContext::new("api").with_correlation_id("req-42");
//! logbridge::info()
//!     .ctx(&ctx)
//!     .str("user", "bob")
//!     .int("attempt", 2)
//!     .msg("signed in");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod context;
mod error;
mod event;
mod format;
mod global;
mod hook;
mod level;
mod logger;
mod option;
mod sink;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_LOG_TIMESTAMPS, LogConfig};
pub use context::{RequestContext, RequestGuard};
pub use error::{LoggingError, LoggingResult};
pub use event::{ERROR_FIELD, Event};
pub use global::{
    LoggerCell, at_level, debug, error, fatal, global, info, is_initialized, log, panic,
    setup_logger, trace, warn,
};
pub use hook::{DEFAULT_TRACING_ID_FIELD, TracingIdFn, TracingIdHook};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder, TARGET};
pub use option::{
    LoggerOption, with_ansi, with_file_config, with_format, with_level, with_output, with_target,
    with_timestamps, with_tracing_id_hook,
};
pub use sink::{FileLogConfig, FileRotation, LogFormat, LogTarget};
