//! Ring Storage
//!
//! Fixed-capacity byte storage addressed by unbounded, monotonically
//! increasing logical offsets. The ring keeps no occupancy state of its own:
//! the writer's cursors decide which logical ranges are live, and the ring
//! only maps logical ranges to physical bytes.
//!
//! Physical placement is `offset % capacity`. A non-empty range whose
//! physical start is at or past its physical end wraps the seam and is
//! copied in two pieces. A zero-length range is a no-op and is never
//! treated as wrapped, even though its start and end indices coincide.

pub(crate) struct RingBuffer {
    buf: Box<[u8]>,
}

impl RingBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Copy `src` into the ring at logical offset `offset`.
    ///
    /// Caller guarantees `src.len() <= capacity` and that the target range
    /// carries no bytes that are still waiting to be drained.
    pub(crate) fn copy_in(&mut self, offset: u64, src: &[u8]) {
        if src.is_empty() {
            return;
        }
        debug_assert!(src.len() <= self.buf.len());
        let cap = self.buf.len() as u64;
        let start = (offset % cap) as usize;
        let end = ((offset + src.len() as u64) % cap) as usize;
        if start >= end {
            // Wrapped: tail of the ring, then the head.
            let first = self.buf.len() - start;
            self.buf[start..].copy_from_slice(&src[..first]);
            self.buf[..end].copy_from_slice(&src[first..]);
        } else {
            self.buf[start..end].copy_from_slice(src);
        }
    }

    /// Copy `dst.len()` bytes out of the ring starting at logical `offset`.
    ///
    /// Caller guarantees `dst.len() <= capacity` and that the source range
    /// holds live bytes.
    pub(crate) fn copy_out(&self, offset: u64, dst: &mut [u8]) {
        if dst.is_empty() {
            return;
        }
        debug_assert!(dst.len() <= self.buf.len());
        let cap = self.buf.len() as u64;
        let start = (offset % cap) as usize;
        let end = ((offset + dst.len() as u64) % cap) as usize;
        if start >= end {
            let first = self.buf.len() - start;
            dst[..first].copy_from_slice(&self.buf[start..]);
            dst[first..].copy_from_slice(&self.buf[..end]);
        } else {
            dst.copy_from_slice(&self.buf[start..end]);
        }
    }

    /// Drop the backing storage. The shuttle calls this exactly once when it
    /// terminates; any copy after release is a protocol bug upstream.
    pub(crate) fn release(&mut self) {
        self.buf = Box::new([]);
    }

    pub(crate) fn is_released(&self) -> bool {
        self.buf.is_empty()
    }
}
