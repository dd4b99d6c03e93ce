//! Shared-Access Wrappers
//!
//! Mutex pass-throughs that make a sink or reader usable from several
//! threads: every clone locks the same inner value, one operation at a
//! time. No coalescing, no reordering; just exclusion.

use std::io::{self, Read};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::sink::Sink;

// ============================================================================
// SyncSink
// ============================================================================

/// Cloneable handle serializing access to an inner [`Sink`].
pub struct SyncSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S: Sink> SyncSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl<S> Clone for SyncSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Sink> Sink for SyncSink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.lock().close()
    }
}

// ============================================================================
// SyncSource
// ============================================================================

/// Cloneable handle serializing access to an inner reader. Clones share one
/// cursor; each read advances it for everyone.
pub struct SyncSource<R> {
    inner: Arc<Mutex<R>>,
}

impl<R: Read + Send> SyncSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl<R> Clone for SyncSource<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Read + Send> Read for SyncSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.lock().read(buf)
    }
}
