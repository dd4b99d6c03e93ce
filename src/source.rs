//! Bounded Byte Sources
//!
//! Test-oriented upstream collaborators: readers of a known length that
//! produce deterministic content without touching a filesystem.
//!
//! - [`NullSource`] yields zeroes.
//! - [`RandomSource`] yields pseudo-random bytes from a process-wide pool,
//!   so the same window re-reads identically within one process.
//!
//! Both implement [`Read`](std::io::Read) and [`Seek`](std::io::Seek) with
//! bounded semantics: reads clamp to the remaining length and seeking
//! outside `[0, len]` is an error.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::OnceLock;

use rand::RngCore;

/// Half the pool is real size; the second half repeats the first so any
/// window of up to `POOL_BYTES` reads contiguously regardless of wrap.
const POOL_BYTES: usize = 8 * 1024 * 1024;

static RANDOM_POOL: OnceLock<Box<[u8]>> = OnceLock::new();

fn random_pool() -> &'static [u8] {
    RANDOM_POOL.get_or_init(|| {
        let mut half = vec![0u8; POOL_BYTES];
        rand::thread_rng().fill_bytes(&mut half);
        let mut doubled = Vec::with_capacity(POOL_BYTES * 2);
        doubled.extend_from_slice(&half);
        doubled.extend_from_slice(&half);
        doubled.into_boxed_slice()
    })
}

fn seek_target(pos: u64, len: u64, seek: SeekFrom) -> io::Result<u64> {
    let target = match seek {
        SeekFrom::Start(offset) => offset as i128,
        SeekFrom::Current(delta) => pos as i128 + delta as i128,
        SeekFrom::End(delta) => len as i128 + delta as i128,
    };
    if target < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "seek before start of source",
        ));
    }
    if target > len as i128 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "seek past end of bounded source",
        ));
    }
    Ok(target as u64)
}

// ============================================================================
// NullSource
// ============================================================================

/// Bounded reader that produces zeroes.
#[derive(Debug, Clone)]
pub struct NullSource {
    len: u64,
    pos: u64,
}

impl NullSource {
    pub fn new(len: u64) -> Self {
        Self { len, pos: 0 }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.len - self.pos
    }
}

impl Read for NullSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (buf.len() as u64).min(self.remaining()) as usize;
        if n == 0 {
            return Ok(0);
        }
        buf[..n].fill(0);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for NullSource {
    fn seek(&mut self, seek: SeekFrom) -> io::Result<u64> {
        self.pos = seek_target(self.pos, self.len, seek)?;
        Ok(self.pos)
    }
}

// ============================================================================
// RandomSource
// ============================================================================

/// Bounded reader over the shared random pool. Content at a given offset is
/// stable for the life of the process, so a consumer can re-read a window
/// (or a second clone can read the same range) and compare.
#[derive(Debug, Clone)]
pub struct RandomSource {
    len: u64,
    pos: u64,
}

impl RandomSource {
    pub fn new(len: u64) -> Self {
        Self { len, pos: 0 }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.len - self.pos
    }
}

impl Read for RandomSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (buf.len() as u64)
            .min(self.remaining())
            .min(POOL_BYTES as u64) as usize;
        if n == 0 {
            return Ok(0);
        }
        let pool = random_pool();
        let at = (self.pos % POOL_BYTES as u64) as usize;
        buf[..n].copy_from_slice(&pool[at..at + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for RandomSource {
    fn seek(&mut self, seek: SeekFrom) -> io::Result<u64> {
        self.pos = seek_target(self.pos, self.len, seek)?;
        Ok(self.pos)
    }
}
