//! Process-wide logger and one-time setup.

use std::sync::{LazyLock, OnceLock};

use crate::error::{LoggingError, LoggingResult};
use crate::event::Event;
use crate::level::Level;
use crate::logger::{Logger, LoggerBuilder};
use crate::option::LoggerOption;

/// A logger slot that can be filled exactly once.
///
/// The first [`setup`](Self::setup) call builds and installs the logger.
/// Callers racing it block until it is installed and then get
/// [`LoggingError::AlreadyInitialized`] without their options having run,
/// so no caller ever observes a partially configured logger.
#[derive(Debug, Default)]
pub struct LoggerCell {
    cell: OnceLock<Logger>,
}

impl LoggerCell {
    /// Create an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Build a logger from `options` and install it.
    ///
    /// The logger is installed even if some options fail; it carries every
    /// option that applied.
    ///
    /// # Errors
    ///
    /// Returns the aggregated option failures of the installing call, or
    /// [`LoggingError::AlreadyInitialized`] if the cell was already filled.
    pub fn setup<I>(&self, options: I) -> LoggingResult<()>
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut outcome = Err(LoggingError::AlreadyInitialized);
        self.cell.get_or_init(|| {
            let mut builder = LoggerBuilder::new();
            outcome = builder.apply(options);
            builder.build()
        });
        outcome
    }

    /// The installed logger, if any.
    #[must_use]
    pub fn get(&self) -> Option<&Logger> {
        self.cell.get()
    }

    /// Whether a logger has been installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

static GLOBAL: LoggerCell = LoggerCell::new();

static FALLBACK: LazyLock<Logger> = LazyLock::new(Logger::default);

/// Set up the process-wide logger. Call once, early in `main`.
///
/// # Errors
///
/// See [`LoggerCell::setup`].
pub fn setup_logger<I>(options: I) -> LoggingResult<()>
where
    I: IntoIterator<Item = LoggerOption>,
{
    GLOBAL.setup(options)
}

/// Whether [`setup_logger`] has installed a logger.
#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL.is_initialized()
}

/// The process-wide logger.
///
/// Before [`setup_logger`] runs this is a default logger writing JSON to
/// stderr at trace level.
#[must_use]
pub fn global() -> &'static Logger {
    GLOBAL.get().unwrap_or_else(|| LazyLock::force(&FALLBACK))
}

/// Open a trace event on the global logger.
pub fn trace() -> Event<'static> {
    global().trace()
}

/// Open a debug event on the global logger.
pub fn debug() -> Event<'static> {
    global().debug()
}

/// Open an info event on the global logger.
pub fn info() -> Event<'static> {
    global().info()
}

/// Open a warn event on the global logger.
pub fn warn() -> Event<'static> {
    global().warn()
}

/// Open an error event on the global logger.
pub fn error() -> Event<'static> {
    global().error()
}

/// Open a fatal event on the global logger.
///
/// Finalizing it exits the process with status 1.
pub fn fatal() -> Event<'static> {
    global().fatal()
}

/// Open a panic event on the global logger.
///
/// Finalizing it panics with the message.
pub fn panic() -> Event<'static> {
    global().panic()
}

/// Open an event without a level on the global logger.
pub fn log() -> Event<'static> {
    global().log()
}

/// Open an event at an arbitrary level on the global logger.
pub fn at_level(level: Level) -> Event<'static> {
    global().at_level(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{with_level, with_output};
    use logbridge_test::SharedBuffer;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_setup_installs_once() {
        let cell = LoggerCell::new();
        let first = SharedBuffer::new();
        let second = SharedBuffer::new();

        assert!(!cell.is_initialized());
        cell.setup([with_output(first.clone())]).unwrap();
        assert!(cell.is_initialized());

        let err = cell
            .setup([with_output(second.clone()), with_level(Level::ERROR)])
            .unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInitialized));

        let logger = cell.get().unwrap();
        assert_eq!(logger.level(), Level::TRACE);
        logger.info().msg("routed to first");

        assert_eq!(first.records().len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_setup_reports_failures_and_installs() {
        let cell = LoggerCell::new();
        let buffer = SharedBuffer::new();

        let err = cell
            .setup([with_level(Level::new(99)), with_output(buffer.clone())])
            .unwrap_err();
        assert!(matches!(err, LoggingError::UnmappedLevel(99)));

        cell.get().unwrap().info().msg("partial config still works");
        assert_eq!(buffer.records().len(), 1);
    }

    #[test]
    fn test_concurrent_setup_first_caller_wins() {
        const THREADS: usize = 8;

        let cell = LoggerCell::new();
        let buffers: Vec<SharedBuffer> = (0..THREADS).map(|_| SharedBuffer::new()).collect();
        let barrier = Barrier::new(THREADS);

        let outcomes: Vec<LoggingResult<()>> = thread::scope(|scope| {
            let handles: Vec<_> = buffers
                .iter()
                .map(|buffer| {
                    let cell = &cell;
                    let barrier = &barrier;
                    let buffer = buffer.clone();
                    scope.spawn(move || {
                        barrier.wait();
                        let outcome = cell.setup([with_output(buffer)]);
                        cell.get().unwrap().info().msg("after setup");
                        outcome
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners = outcomes.iter().filter(|o| o.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(
            outcomes
                .iter()
                .filter_map(|o| o.as_ref().err())
                .all(|e| matches!(e, LoggingError::AlreadyInitialized))
        );

        let written: Vec<usize> = buffers.iter().map(|b| b.records().len()).collect();
        assert_eq!(written.iter().filter(|&&n| n > 0).count(), 1);
        assert_eq!(written.iter().sum::<usize>(), THREADS);
    }
}
