//! Prelude module - commonly used types for convenient import.
//!
//! Use `use logbridge::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust,no_run
//! use logbridge::prelude::*;
//!
//! # fn main() -> LoggingResult<()> {
//! let config = LogConfig::from_toml_str("level = \"debug\"")?;
//! setup_logger(config.into_options())?;
//!
//! logbridge::debug().str("phase", "startup").msg("configured");
//! # Ok(())
//! # }
//! ```

// Errors
pub use crate::{LoggingError, LoggingResult};

// Levels and configuration
pub use crate::{FileLogConfig, FileRotation, Level, LogConfig, LogFormat, LogTarget};

// Logger and setup
pub use crate::{Event, Logger, LoggerBuilder, LoggerCell, LoggerOption, setup_logger};

// Options
pub use crate::{
    with_ansi, with_file_config, with_format, with_level, with_output, with_target,
    with_timestamps, with_tracing_id_hook,
};

// Request context and hook
pub use crate::{RequestContext, RequestGuard, TracingIdHook};
