//! CRC32 Pass-Through Sink
//!
//! Wraps any [`Sink`] and folds every byte that the inner sink accepted into
//! a running CRC32. The checksum lives behind a cloneable handle, so it
//! stays readable after the decorated sink has been handed to a
//! [`CoalescingWriter`](crate::CoalescingWriter) and consumed.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::sink::Sink;

pub struct Crc32Sink<S> {
    inner: S,
    hasher: Arc<Mutex<crc32fast::Hasher>>,
}

impl<S: Sink> Crc32Sink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            hasher: Arc::new(Mutex::new(crc32fast::Hasher::new())),
        }
    }

    /// Handle for reading the checksum later, independent of who owns the
    /// sink by then.
    pub fn handle(&self) -> Crc32Handle {
        Crc32Handle {
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<S: Sink> Sink for Crc32Sink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        // Only bytes the inner sink accepted count toward the checksum.
        self.inner.write(buf)?;
        self.hasher.lock().update(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.close()
    }
}

/// Cloneable view of a [`Crc32Sink`]'s running checksum.
#[derive(Clone)]
pub struct Crc32Handle {
    hasher: Arc<Mutex<crc32fast::Hasher>>,
}

impl Crc32Handle {
    /// CRC32 of all bytes accepted so far.
    pub fn value(&self) -> u32 {
        self.hasher.lock().clone().finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_checksum_matches_direct_hash() {
        let collected = MemorySink::new();
        let mut sink = Crc32Sink::new(collected.clone());
        let handle = sink.handle();

        sink.write(b"some bytes ").unwrap();
        sink.write(b"in two pieces").unwrap();
        sink.flush().unwrap();
        sink.close().unwrap();

        let mut direct = crc32fast::Hasher::new();
        direct.update(b"some bytes in two pieces");
        assert_eq!(handle.value(), direct.finalize());
        assert_eq!(collected.contents(), b"some bytes in two pieces");
    }

    #[test]
    fn test_rejected_bytes_do_not_count() {
        let collected = MemorySink::new();
        let mut sink = Crc32Sink::new(collected.clone());
        let handle = sink.handle();

        sink.write(b"counted").unwrap();
        let before = handle.value();

        // Close the inner sink out from under the decorator; the next write
        // fails and must leave the checksum untouched.
        collected.clone().close().unwrap();
        assert!(sink.write(b"rejected").is_err());
        assert_eq!(handle.value(), before);
    }
}
