//! Writer Performance Benchmarks
//!
//! This benchmark suite measures the producer-visible hot paths of the
//! coalescing writer. The shuttle drains into `std::io::sink()` so the
//! numbers reflect coordination cost, not device speed.
//!
//! ## What We Benchmark
//!
//! ### 1. Producer Copy Path (`bench_coalesced_write`)
//! - Measures bytes/second for `write` across payload sizes (64B to 1MB)
//! - One long-lived writer per size; drains proceed concurrently
//! - Captures lock + gate + ring-copy overhead per call
//!
//! ### 2. Single-Byte Path (`bench_write_byte`)
//! - Measures calls/second for `write_byte`
//! - The worst case for coordination overhead: one byte per lock round trip
//!
//! ### 3. Flush Barrier (`bench_write_flush`)
//! - Measures a full write + flush durability round trip
//! - Crosses both condvars: producer -> shuttle -> flush waiter
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench --bench writer_bench
//!
//! # Run a specific group
//! cargo bench --bench writer_bench coalesced_write
//!
//! # Save a baseline for comparison
//! cargo bench --bench writer_bench -- --save-baseline main
//! ```
//!
//! ## Interpreting Results
//!
//! - **time**: Average time per operation
//! - **thrpt**: Throughput in GiB/s (copy path) or Melem/s (byte path)
//! - The flush barrier is dominated by thread wakeup latency, not copying

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shuttlebuf::{CoalescingWriter, IoSink};

fn bench_coalesced_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("coalesced_write");

    for size in [64usize, 4 * 1024, 64 * 1024, 1024 * 1024] {
        let payload = vec![0xa5u8; size];
        let writer = CoalescingWriter::new(IoSink::new(std::io::sink()));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, data| {
            b.iter(|| {
                writer.write(black_box(data)).unwrap();
            });
        });
        writer.close().unwrap();
    }

    group.finish();
}

fn bench_write_byte(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_byte");
    group.throughput(Throughput::Elements(1));

    let writer = CoalescingWriter::new(IoSink::new(std::io::sink()));
    group.bench_function("single_byte", |b| {
        b.iter(|| {
            writer.write_byte(black_box(0x42)).unwrap();
        });
    });
    writer.close().unwrap();

    group.finish();
}

fn bench_write_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_flush");

    for size in [1024usize, 64 * 1024] {
        let payload = vec![0x5au8; size];
        let writer = CoalescingWriter::new(IoSink::new(std::io::sink()));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, data| {
            b.iter(|| {
                writer.write(black_box(data)).unwrap();
                writer.flush().unwrap();
            });
        });
        writer.close().unwrap();
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_coalesced_write,
    bench_write_byte,
    bench_write_flush
);
criterion_main!(benches);
