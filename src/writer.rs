//! Coalescing Writer Core
//!
//! ## Purpose
//!
//! Decouple producer latency from sink latency: producers copy bytes into a
//! fixed in-memory ring and return, while one dedicated thread (the
//! *shuttle*) drains whatever has accumulated and hands it to the sink as a
//! single large `write` + `flush` per pass. Many small producer writes
//! become few large sink calls.
//!
//! ## Data Flow
//!
//! ```text
//!  producer threads                               shuttle thread
//!  ───────────────                                ──────────────
//!  write() ──┐
//!  write() ──┼──► [ ring buffer, capacity C ] ──► extract batch ──► sink.write
//!  write() ──┘         ▲            ▲                                sink.flush
//!                  written        flushed                               │
//!                  cursor         cursor             persisted ◄────────┘
//!                                                    cursor
//! ```
//!
//! Three cursors, all monotonic logical offsets:
//!
//! - `written`: end of accepted bytes; producers advance it under the
//!   coordination lock.
//! - `flushed`: end of extracted bytes; the shuttle advances it under the
//!   lock at extraction time, so ring space frees before the sink call even
//!   starts.
//! - `persisted`: end of sink-flushed bytes; the shuttle stores it after a
//!   successful pass, without the lock. `persisted <= flushed <= written`
//!   and `written - flushed <= C` always hold.
//!
//! The coordination lock is released with fair handoff on every hot path:
//! queued waiters take it in arrival order, so a stream of eager producers
//! cannot starve the shuttle out of its drain turn.
//!
//! ## Failure Semantics
//!
//! Sink failures happen on the shuttle thread, far from any caller. The
//! failed batch is dropped, the error is parked in a sticky slot, and the
//! *next* `write` or `flush` returns it; `close` refuses to complete while
//! it is set. The slot is never cleared: after any sink failure the stream
//! is permanently errored and should be dropped. All waits are
//! uninterruptible; if the sink fails permanently, a `flush` already
//! blocked past the failure point never returns.
//!
//! ## Usage
//!
//! ```
//! use shuttlebuf::{CoalescingWriter, MemorySink};
//!
//! let sink = MemorySink::new();
//! let writer = CoalescingWriter::new(sink.clone());
//! writer.write(b"hello, sink").unwrap();
//! writer.flush().unwrap(); // durability barrier
//! assert_eq!(sink.contents(), b"hello, sink");
//! writer.close().unwrap();
//! ```

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use bytes::BytesMut;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error, trace};

use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::metrics::{MetricsSnapshot, WriterMetrics};
use crate::ring::RingBuffer;
use crate::sink::Sink;

// ============================================================================
// Shared state
// ============================================================================

/// Sink failure captured on the shuttle thread. Kept as kind + message so
/// the sticky slot can mint a fresh [`Error`] for every call that surfaces
/// it.
#[derive(Debug, Clone)]
struct SinkFailure {
    kind: io::ErrorKind,
    message: String,
}

impl SinkFailure {
    fn from_io(err: &io::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    fn to_error(&self) -> Error {
        Error::Sink {
            kind: self.kind,
            message: self.message.clone(),
        }
    }
}

/// Everything the coordination lock protects: ring storage, the producer and
/// extraction cursors, the closed flag, and the shuttle handle.
struct CoordState {
    ring: RingBuffer,
    written: u64,
    flushed: u64,
    closed: bool,
    shuttle: Option<JoinHandle<()>>,
}

impl CoordState {
    fn pending(&self) -> u64 {
        self.written - self.flushed
    }

    fn has_space_for(&self, len: usize) -> bool {
        len as u64 <= self.ring.capacity() as u64 - self.pending()
    }
}

struct Shared {
    config: WriterConfig,
    coord: Mutex<CoordState>,
    /// Only the shuttle waits here; producers and `close` signal it.
    data_available: Condvar,
    /// Producers wait here for ring space, flush callers for durability
    /// progress; the shuttle signals it once per pass.
    space_available: Condvar,
    /// Written only by the shuttle, without the lock. Stale reads are fine:
    /// every waiter re-checks under the lock after waking.
    persisted: AtomicU64,
    /// Sticky failure slot; set by the shuttle, never cleared.
    last_error: Mutex<Option<SinkFailure>>,
    /// Shuttle-only during operation; the closing thread locks it once,
    /// after the join.
    sink: Mutex<Box<dyn Sink>>,
    /// Serializes producer copy phases. `flush`/`close` never take it.
    write_gate: Mutex<()>,
    metrics: WriterMetrics,
}

// ============================================================================
// CoalescingWriter
// ============================================================================

/// Write-coalescing stream over a [`Sink`].
///
/// Shareable by reference from any number of producer threads (wrap in an
/// [`Arc`] to share ownership); all methods take `&self`. The shuttle thread
/// is spawned lazily on the first write and joined by [`close`].
///
/// Dropping an unclosed writer marks the stream closed and detaches the
/// shuttle, which exits after draining what is already buffered; nothing is
/// joined and the sink is not closed. Call [`close`] for the full protocol.
///
/// [`close`]: CoalescingWriter::close
pub struct CoalescingWriter {
    shared: Arc<Shared>,
}

impl CoalescingWriter {
    /// Writer with the default 4MB ring over `sink`.
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self::build(Box::new(sink), WriterConfig::default())
    }

    /// Writer with explicit configuration. Fails with
    /// [`Error::InvalidConfig`] before touching anything shared.
    pub fn with_config(sink: impl Sink + 'static, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(Box::new(sink), config))
    }

    fn build(sink: Box<dyn Sink>, config: WriterConfig) -> Self {
        let shared = Arc::new(Shared {
            coord: Mutex::new(CoordState {
                ring: RingBuffer::new(config.capacity),
                written: 0,
                flushed: 0,
                closed: false,
                shuttle: None,
            }),
            data_available: Condvar::new(),
            space_available: Condvar::new(),
            persisted: AtomicU64::new(0),
            last_error: Mutex::new(None),
            sink: Mutex::new(sink),
            write_gate: Mutex::new(()),
            metrics: WriterMetrics::default(),
            config,
        });
        Self { shared }
    }

    /// Copy `buf` into the ring.
    ///
    /// Writes longer than `max_block` are split into consecutive sub-writes
    /// of at most `max_block` bytes. Each sub-write lands contiguously with
    /// no interleaving from other producers; boundaries between sub-writes
    /// make no such promise. Blocks while the ring lacks space for the
    /// current sub-write.
    ///
    /// Returns the sticky sink error if one is pending; the bytes of the
    /// current sub-write were still accepted in that case.
    pub fn write(&self, buf: &[u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        for chunk in buf.chunks(self.shared.config.max_block) {
            self.write_block(chunk)?;
        }
        Ok(())
    }

    /// Single-byte write; same contract as [`write`](CoalescingWriter::write).
    pub fn write_byte(&self, byte: u8) -> Result<()> {
        self.write_block(&[byte])
    }

    /// Durability barrier: returns once every byte accepted before this call
    /// has been written *and flushed* by the sink, then surfaces the sticky
    /// error if one is set.
    ///
    /// Sharp edge, per contract: after a sink failure `persisted` only
    /// advances again if a later drain succeeds. A `flush` already blocked
    /// across a permanent sink failure therefore never returns.
    pub fn flush(&self) -> Result<()> {
        let st = self.shared.coord.lock();
        if st.closed {
            return Err(Error::Closed);
        }
        self.barrier(st)
    }

    /// Drain everything, stop the shuttle, close the sink.
    ///
    /// Idempotent once it has succeeded. A sticky sink error aborts the
    /// close before the stream is marked closed: the shuttle keeps running,
    /// the error keeps surfacing, and every retry fails the same way. After
    /// any sink failure the stream is permanently errored and should be
    /// dropped instead.
    pub fn close(&self) -> Result<()> {
        let st = self.shared.coord.lock();
        if st.closed {
            return Ok(());
        }
        self.barrier(st)?;

        let mut st = self.shared.coord.lock();
        if st.closed {
            // Lost a close race while the barrier ran; the winner finishes
            // the teardown.
            return Ok(());
        }
        st.closed = true;
        self.shared.data_available.notify_all();
        let shuttle = st.shuttle.take();
        MutexGuard::unlock_fair(st);

        if let Some(handle) = shuttle {
            handle.join().map_err(|_| Error::ShuttlePanicked)?;
        }

        if let Err(err) = self.shared.sink.lock().close() {
            return Err(Error::Sink {
                kind: err.kind(),
                message: err.to_string(),
            });
        }

        let snap = self.shared.metrics.snapshot();
        debug!(
            bytes_accepted = snap.bytes_accepted,
            bytes_persisted = snap.bytes_persisted,
            drains = snap.drains,
            "coalescing writer closed"
        );
        Ok(())
    }

    /// Point-in-time counters; cheap, no locks.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn write_block(&self, chunk: &[u8]) -> Result<()> {
        let gate = self.shared.write_gate.lock();
        let mut st = self.shared.coord.lock();
        if st.closed {
            return Err(Error::Closed);
        }
        self.ensure_shuttle(&mut st)?;
        while !st.has_space_for(chunk.len()) {
            self.shared.metrics.note_space_wait();
            self.shared.space_available.wait(&mut st);
            if st.ring.is_released() {
                // The stream closed and fully drained while this producer
                // was parked; nothing was admitted.
                return Err(Error::Closed);
            }
        }
        let offset = st.written;
        st.ring.copy_in(offset, chunk);
        st.written = offset + chunk.len() as u64;
        self.shared.data_available.notify_all();
        MutexGuard::unlock_fair(st);
        drop(gate);

        self.shared.metrics.note_accepted(chunk.len());
        self.surface_sticky()
    }

    /// Spawn the shuttle on the first admitted sub-write. Runs under the
    /// coordination lock, so the spawn decision is atomic with the cursor
    /// state the shuttle first observes.
    fn ensure_shuttle(&self, st: &mut CoordState) -> Result<()> {
        if st.shuttle.is_some() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("shuttlebuf-drain".to_string())
            .spawn(move || Shuttle::new(shared).run())
            .map_err(Error::ShuttleSpawn)?;
        st.shuttle = Some(handle);
        debug!(
            capacity = self.shared.config.capacity,
            "shuttle thread started"
        );
        Ok(())
    }

    /// Wait under the lock until `persisted` covers everything written at
    /// entry, then surface the sticky failure if any.
    fn barrier(&self, mut st: MutexGuard<'_, CoordState>) -> Result<()> {
        let target = st.written;
        while self.shared.persisted.load(Ordering::Acquire) < target {
            self.shared.space_available.wait(&mut st);
        }
        MutexGuard::unlock_fair(st);
        self.surface_sticky()
    }

    fn surface_sticky(&self) -> Result<()> {
        match &*self.shared.last_error.lock() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

impl io::Write for CoalescingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        CoalescingWriter::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        CoalescingWriter::flush(self).map_err(io::Error::from)
    }
}

/// Shared-reference interop, same shape as `impl Write for &File`: lets
/// several holders of `&CoalescingWriter` use `write!` and friends.
impl io::Write for &CoalescingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        CoalescingWriter::write(*self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        CoalescingWriter::flush(*self).map_err(io::Error::from)
    }
}

impl Drop for CoalescingWriter {
    fn drop(&mut self) {
        let mut st = self.shared.coord.lock();
        if st.closed {
            return;
        }
        st.closed = true;
        self.shared.data_available.notify_all();
        if st.shuttle.take().is_some() {
            debug!("writer dropped while open; shuttle detached to finish draining");
        }
    }
}

// ============================================================================
// Shuttle (drain worker)
// ============================================================================

/// The dedicated drain worker: one per writer, spawned on the first write,
/// exits once the stream is both closed and fully extracted.
struct Shuttle {
    shared: Arc<Shared>,
    /// Reused extraction buffer; grows to at most the ring capacity.
    scratch: BytesMut,
}

impl Shuttle {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            scratch: BytesMut::new(),
        }
    }

    fn run(mut self) {
        debug!("shuttle running");
        loop {
            let pass_started = if self.shared.config.trace_drains {
                Some(Instant::now())
            } else {
                None
            };

            let mut st = self.shared.coord.lock();
            // Progress first: anything extracted on the previous pass means
            // producer space and possibly a satisfied flush barrier.
            if st.flushed > 0 {
                self.shared.space_available.notify_all();
            }
            while st.written == st.flushed && !st.closed {
                self.shared.data_available.wait(&mut st);
            }
            if st.written == st.flushed && st.closed {
                st.ring.release();
                MutexGuard::unlock_fair(st);
                debug!("shuttle exiting: closed and drained");
                return;
            }

            let endpoint = st.written;
            let from = st.flushed;
            let len = (endpoint - from) as usize;
            self.scratch.resize(len, 0);
            st.ring.copy_out(from, &mut self.scratch);
            // Space frees here, before the sink sees a byte.
            st.flushed = endpoint;
            MutexGuard::unlock_fair(st);

            if let Some(started) = pass_started {
                trace!(
                    bytes = len,
                    waited_us = started.elapsed().as_micros() as u64,
                    "drain pass"
                );
            }

            let result = {
                let mut sink = self.shared.sink.lock();
                sink.write(&self.scratch).and_then(|()| sink.flush())
            };
            match result {
                Ok(()) => {
                    self.shared.persisted.store(endpoint, Ordering::Release);
                    self.shared.metrics.note_drain(len);
                }
                Err(err) => {
                    error!(
                        error = %err,
                        dropped_bytes = len,
                        "sink rejected drained bytes; error held for the next write or flush"
                    );
                    // Slot first, counter second: anyone who has seen the
                    // counter move can rely on the slot being set.
                    *self.shared.last_error.lock() = Some(SinkFailure::from_io(&err));
                    self.shared.metrics.note_sink_error();
                }
            }
        }
    }
}
