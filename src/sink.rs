//! Sink Abstraction
//!
//! The downstream side of the coalescing writer. A [`Sink`] receives the
//! large drained batches the shuttle extracts from the ring; it is the
//! crate's outer boundary, so everything past it (files, sockets, object
//! uploads) hides behind this trait.
//!
//! Call discipline: the shuttle is the only caller of `write`/`flush`, one
//! batch at a time, and the closing thread calls `close` exactly once after
//! the shuttle has been joined. Implementations therefore never see
//! concurrent calls from the writer; wrap a sink in
//! [`SyncSink`](crate::SyncSink) if it must additionally be shared
//! elsewhere.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

// ============================================================================
// Trait
// ============================================================================

/// A downstream byte sink: accepts whole batches, flushes on demand, closes
/// once.
pub trait Sink: Send {
    /// Accept the whole batch or fail; partial writes are the
    /// implementation's problem, not the caller's.
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Push accepted bytes to wherever they must survive.
    fn flush(&mut self) -> io::Result<()>;

    /// Final call; no `write` or `flush` follows it.
    fn close(&mut self) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

// ============================================================================
// IoSink
// ============================================================================

/// Bridges any [`std::io::Write`] (a `File`, a socket, `io::sink()`) into a
/// [`Sink`]. `close` flushes; the wrapped writer's own teardown happens on
/// drop, as usual for `io::Write`.
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
}

impl<W: io::Write + Send> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Take the wrapped writer back out.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write + Send> Sink for IoSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ============================================================================
// MemorySink
// ============================================================================

/// In-memory collecting sink.
///
/// Cloning is shallow: every clone shares the same storage, so a handle kept
/// by the caller stays readable after another clone was consumed by the
/// writer. That is the usual test arrangement:
///
/// ```
/// use shuttlebuf::{CoalescingWriter, MemorySink};
///
/// let sink = MemorySink::new();
/// let writer = CoalescingWriter::new(sink.clone());
/// writer.write(b"payload").unwrap();
/// writer.close().unwrap();
/// assert_eq!(sink.contents(), b"payload");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    data: Vec<u8>,
    flushes: u64,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.state.lock().data.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().data.is_empty()
    }

    /// Number of `flush` calls accepted.
    pub fn flush_count(&self) -> u64 {
        self.state.lock().flushes
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Sink for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "memory sink is closed",
            ));
        }
        state.data.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "memory sink is closed",
            ));
        }
        state.flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}
