//! End-to-end, single-threaded behavior of the coalescing writer: payload
//! fidelity across ring wraps and splits, the flush barrier, decorator
//! composition, and real-file sinks.

use std::fs::File;
use std::io::{Read, Write};
use std::time::Duration;

use rand::RngCore;

use shuttlebuf::{
    CoalescingWriter, Crc32Sink, DelaySink, IoSink, MemorySink, RandomSource, WriterConfig,
};

fn random_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut payload);
    payload
}

#[test]
fn test_zero_length_write_reaches_nothing() {
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());
    writer.write(b"").unwrap();
    writer.close().unwrap();

    assert!(sink.is_empty());
    assert!(sink.is_closed());
    assert_eq!(writer.metrics().bytes_accepted, 0);
}

#[test]
fn test_single_byte_survives() {
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());
    writer.write_byte(100).unwrap();
    writer.close().unwrap();

    assert_eq!(sink.contents(), [100]);
}

#[test]
fn test_exact_ring_capacity_round_trips() {
    let payload = random_payload(4 * 1024 * 1024);
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());
    writer.write(&payload).unwrap();
    writer.close().unwrap();

    assert_eq!(sink.contents(), payload);
}

#[test]
fn test_write_larger_than_ring_splits_and_survives() {
    let payload = random_payload(5 * 1024 * 1024);
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());
    writer.write(&payload).unwrap();
    writer.close().unwrap();

    assert_eq!(sink.contents(), payload);
}

#[test]
fn test_many_ring_laps_round_trip() {
    let payload = random_payload(15 * 1024 * 1024);
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());
    writer.write(&payload).unwrap();
    writer.close().unwrap();

    assert_eq!(sink.contents(), payload);
}

#[test]
fn test_ten_thousand_records_arrive_in_order_despite_slow_flushes() {
    // Each drain pass stalls in flush while the producer keeps writing, so
    // the ring wraps many times and drains pick up whole batches of lines.
    let sink = MemorySink::new();
    let slow = DelaySink::with_delays(
        sink.clone(),
        Duration::ZERO,
        Duration::from_millis(1),
        Duration::ZERO,
    );
    let config = WriterConfig {
        capacity: 32 * 1024,
        max_block: 8 * 1024,
        ..Default::default()
    };
    let writer = CoalescingWriter::with_config(slow, config).unwrap();

    let mut expected = Vec::new();
    let mut by_ref = &writer;
    for i in 0..10_000u32 {
        let line = format!("record {i:05} of this stream\n");
        write!(by_ref, "{line}").unwrap();
        expected.extend_from_slice(line.as_bytes());
    }
    writer.close().unwrap();

    let contents = sink.contents();
    assert_eq!(contents, expected);

    // Parse it back: every line number 0..10_000 exactly once, in order.
    let text = String::from_utf8(contents).unwrap();
    let mut lines_seen = 0u32;
    for (i, line) in text.lines().enumerate() {
        let number: u32 = line[7..12].parse().unwrap();
        assert_eq!(number, i as u32);
        lines_seen += 1;
    }
    assert_eq!(lines_seen, 10_000);

    let snap = writer.metrics();
    assert!(snap.drains < 10_000, "drains = {}", snap.drains);
    assert!(
        snap.largest_drain > 28,
        "largest_drain = {}",
        snap.largest_drain
    );
}

#[test]
fn test_flush_is_a_durability_barrier() {
    let sink = MemorySink::new();
    let slow = DelaySink::new(sink.clone(), Duration::from_millis(25));
    let config = WriterConfig {
        capacity: 64 * 1024,
        max_block: 16 * 1024,
        ..Default::default()
    };
    let writer = CoalescingWriter::with_config(slow, config).unwrap();

    let payload = random_payload(200 * 1024);
    writer.write(&payload).unwrap();
    writer.flush().unwrap();

    // Everything written before the flush call is in the sink once it
    // returns, slow sink or not.
    assert_eq!(sink.contents(), payload);
    writer.close().unwrap();
}

#[test]
fn test_file_sink_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coalesced.bin");
    let payload = random_payload(1024 * 1024);

    let file = File::create(&path).unwrap();
    let writer = CoalescingWriter::new(IoSink::new(file));
    writer.write(&payload).unwrap();
    writer.close().unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), payload);
}

#[test]
fn test_crc32_decorator_sees_exactly_the_drained_bytes() {
    let collected = MemorySink::new();
    let checksummed = Crc32Sink::new(collected.clone());
    let handle = checksummed.handle();
    let writer = CoalescingWriter::new(checksummed);

    let payload = random_payload(3 * 1024 * 1024);
    writer.write(&payload).unwrap();
    writer.close().unwrap();

    let mut direct = crc32fast::Hasher::new();
    direct.update(&payload);
    assert_eq!(handle.value(), direct.finalize());
    assert_eq!(collected.contents(), payload);
}

#[test]
fn test_random_source_copies_through_the_writer() {
    let len = 1024 * 1024u64;
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());

    let mut source = RandomSource::new(len);
    let mut by_ref = &writer;
    std::io::copy(&mut source, &mut by_ref).unwrap();
    writer.close().unwrap();

    // The pool is stable within the process: a fresh source over the same
    // range must reproduce what landed in the sink.
    let mut expected = Vec::new();
    RandomSource::new(len).read_to_end(&mut expected).unwrap();
    assert_eq!(sink.contents(), expected);
}

#[test]
fn test_metrics_reflect_traffic() {
    let sink = MemorySink::new();
    let writer = CoalescingWriter::new(sink.clone());
    let payload = random_payload(256 * 1024);
    writer.write(&payload).unwrap();
    writer.flush().unwrap();

    let snap = writer.metrics();
    assert_eq!(snap.bytes_accepted, payload.len() as u64);
    assert_eq!(snap.bytes_persisted, payload.len() as u64);
    assert!(snap.drains >= 1);
    assert!(snap.largest_drain >= 1);
    assert_eq!(snap.sink_errors, 0);
    writer.close().unwrap();
}
