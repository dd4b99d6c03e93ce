//! Delay-Injecting Sink
//!
//! Pass-through decorator that sleeps before forwarding each operation.
//! Exists to make a sink slow on purpose: backpressure tests, drain-timing
//! tests, and anything else that needs the shuttle to lag behind producers
//! in a controlled way.

use std::io;
use std::thread;
use std::time::Duration;

use crate::sink::Sink;

pub struct DelaySink<S> {
    inner: S,
    write_delay: Duration,
    flush_delay: Duration,
    close_delay: Duration,
}

impl<S: Sink> DelaySink<S> {
    /// The same delay before every operation.
    pub fn new(inner: S, delay: Duration) -> Self {
        Self::with_delays(inner, delay, delay, delay)
    }

    /// Independent delays for each operation.
    pub fn with_delays(
        inner: S,
        write_delay: Duration,
        flush_delay: Duration,
        close_delay: Duration,
    ) -> Self {
        Self {
            inner,
            write_delay,
            flush_delay,
            close_delay,
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

impl<S: Sink> Sink for DelaySink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        pause(self.write_delay);
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        pause(self.flush_delay);
        self.inner.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        pause(self.close_delay);
        self.inner.close()
    }
}
