//! In-memory sink for capturing log output.

use std::io;
use std::sync::{Arc, Mutex};

use crate::record::Record;

/// A clonable in-memory byte sink.
///
/// Every clone writes into the same buffer, so one clone can be handed to a
/// logger while the test keeps another to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let guard = self
            .bytes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        String::from_utf8_lossy(&guard).into_owned()
    }

    /// Non-empty lines written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Lines decoded as JSON records. Lines that are not JSON are skipped.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.lines()
            .iter()
            .filter_map(|line| Record::parse(line))
            .collect()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes
            .lock()
            .map(|guard| guard.is_empty())
            .unwrap_or(true)
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.bytes.lock() {
            guard.clear();
        }
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .bytes
            .lock()
            .map_err(|e| io::Error::other(format!("buffer lock poisoned: {e}")))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
