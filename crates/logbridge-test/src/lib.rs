//! Logbridge Test - Shared test utilities for the logbridge facade.
//!
//! This crate provides an in-memory sink and helpers for decoding the JSON
//! records a logger writes into it. It has no dependency on `logbridge`
//! itself so it can be used from that crate's unit tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logbridge::{Logger, with_output};
//! use logbridge_test::SharedBuffer;
//!
//! let buffer = SharedBuffer::new();
//! let mut builder = Logger::builder();
//! builder.apply([with_output(buffer.clone())]).unwrap();
//! let logger = builder.build();
//!
//! logger.info().str("user", "bob").msg("signed in");
//!
//! let record = buffer.records().remove(0);
//! assert_eq!(record.message(), Some("signed in"));
//! assert_eq!(record.field("user"), Some(&"bob".into()));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod buffer;
mod record;

pub use buffer::SharedBuffer;
pub use record::Record;
