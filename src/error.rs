//! Error Types
//!
//! This module defines all error types the coalescing writer can surface.
//!
//! ## Error Categories
//!
//! ### Caller Errors
//! - `InvalidConfig`: Configuration rejected at construction time
//! - `Closed`: Operation on a stream that was already closed
//!
//! ### Drain Errors
//! - `Sink`: The sink rejected a drained batch; captured on the shuttle
//!   thread and surfaced later (see the sticky-error notes on
//!   [`CoalescingWriter`](crate::CoalescingWriter))
//!
//! ### Thread Errors
//! - `ShuttleSpawn`: The shuttle thread could not be started
//! - `ShuttlePanicked`: Joining the shuttle at close time found it dead
//!
//! ## Usage
//!
//! All writer operations return `Result<T>` which is aliased to
//! `Result<T, Error>`. This allows clean error propagation with `?`.
//! Sink failures carry the originating `io::ErrorKind` plus the rendered
//! message rather than the `io::Error` itself, so the same failure can be
//! surfaced to any number of later calls.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Stream is closed")]
    Closed,

    #[error("Sink error ({kind:?}): {message}")]
    Sink { kind: io::ErrorKind, message: String },

    #[error("Failed to spawn shuttle thread: {0}")]
    ShuttleSpawn(#[source] io::Error),

    #[error("Shuttle thread panicked before it could be joined")]
    ShuttlePanicked,
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match &err {
            Error::InvalidConfig(_) => io::ErrorKind::InvalidInput,
            Error::Closed => io::ErrorKind::BrokenPipe,
            Error::Sink { kind, .. } => *kind,
            Error::ShuttleSpawn(e) => e.kind(),
            Error::ShuttlePanicked => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
