//! Writer Metrics
//!
//! Cheap always-on counters for the write path. Producers and the shuttle
//! bump relaxed atomics; [`WriterMetrics::snapshot`] reads them into a plain
//! struct for assertions and logging. There is no export surface here, only
//! the snapshot accessor on the writer.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct WriterMetrics {
    /// Bytes accepted into the ring by producers.
    bytes_accepted: AtomicU64,
    /// Bytes the sink has accepted and flushed.
    bytes_persisted: AtomicU64,
    /// Drain passes that reached the sink successfully.
    drains: AtomicU64,
    /// Drain passes the sink rejected.
    sink_errors: AtomicU64,
    /// Times a producer blocked waiting for ring space.
    space_waits: AtomicU64,
    /// Largest single drain pass in bytes.
    largest_drain: AtomicU64,
}

impl WriterMetrics {
    pub(crate) fn note_accepted(&self, len: usize) {
        self.bytes_accepted.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub(crate) fn note_drain(&self, len: usize) {
        self.drains.fetch_add(1, Ordering::Relaxed);
        self.bytes_persisted.fetch_add(len as u64, Ordering::Relaxed);
        self.largest_drain.fetch_max(len as u64, Ordering::Relaxed);
    }

    pub(crate) fn note_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_space_wait(&self) {
        self.space_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_accepted: self.bytes_accepted.load(Ordering::Relaxed),
            bytes_persisted: self.bytes_persisted.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            space_waits: self.space_waits.load(Ordering::Relaxed),
            largest_drain: self.largest_drain.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`CoalescingWriter`](crate::CoalescingWriter)
/// counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bytes_accepted: u64,
    pub bytes_persisted: u64,
    pub drains: u64,
    pub sink_errors: u64,
    pub space_waits: u64,
    pub largest_drain: u64,
}
