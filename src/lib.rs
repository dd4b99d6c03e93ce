//! # shuttlebuf
//!
//! Write-coalescing byte buffer: producers write into a fixed in-memory
//! ring and return quickly, while a dedicated *shuttle* thread drains the
//! accumulated bytes to a slow [`Sink`] in large batches, one
//! `write` + `flush` pair per drain pass, no matter how many producer
//! writes piled up behind it.
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────┐     write()      ┌─────────────────────┐
//! │  producers   │ ───────────────► │  ring buffer (4MB)  │
//! │ (any thread) │   blocks when    │  written / flushed  │
//! └──────────────┘      full        └──────────┬──────────┘
//!                                              │ batch extract
//!                                              ▼
//!                                   ┌─────────────────────┐
//!                                   │   shuttle thread    │
//!                                   │ sink.write + flush  │
//!                                   │ advances persisted  │
//!                                   └─────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! - **Byte-granular backpressure**: a producer blocks only while its
//!   sub-write (at most `max_block` bytes) does not fit in the ring; ring
//!   space frees at extraction time, before the sink call completes.
//! - **Fair handoff**: the coordination lock is released with FIFO fairness
//!   so the shuttle gets its turn between producer bursts.
//! - **No sink retries**: a failed drain drops its batch and parks the error
//!   in a sticky slot; the next `write` or `flush` surfaces it and `close`
//!   refuses to run. The stream is permanently errored afterwards.
//! - **Uninterruptible waits**: `write`, `flush` and `close` block until
//!   their condition holds; there are no timeouts and no cancellation.
//!
//! Everything downstream hides behind the [`Sink`] trait; adapters for
//! standard writers, in-memory collection, checksumming, delay injection
//! and cross-thread sharing ship in this crate, along with bounded
//! zero-filled and pseudo-random readers for feeding tests.

pub mod checksum;
pub mod config;
pub mod delay;
pub mod error;
pub mod metrics;
mod ring;
pub mod sink;
pub mod source;
pub mod sync;
pub mod writer;

pub use checksum::{Crc32Handle, Crc32Sink};
pub use config::WriterConfig;
pub use delay::DelaySink;
pub use error::{Error, Result};
pub use metrics::MetricsSnapshot;
pub use sink::{IoSink, MemorySink, Sink};
pub use source::{NullSource, RandomSource};
pub use sync::{SyncSink, SyncSource};
pub use writer::CoalescingWriter;
