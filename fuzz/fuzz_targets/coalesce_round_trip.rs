#![no_main]

use libfuzzer_sys::fuzz_target;
use shuttlebuf::{CoalescingWriter, MemorySink, WriterConfig};

fuzz_target!(|data: &[u8]| {
    // First four bytes steer the geometry, the rest is payload. The writer
    // must reproduce the payload byte for byte in the sink regardless of:
    // - Tiny rings that wrap many times per input
    // - max_block values that force sub-write splitting
    // - Chunk boundaries landing anywhere, including zero-length writes
    if data.len() < 4 {
        return;
    }
    let capacity = 1 + (u16::from_le_bytes([data[0], data[1]]) as usize % 4096);
    let max_block = 1 + (data[2] as usize % capacity);
    let chunk_hint = 1 + (data[3] as usize % 64);
    let payload = &data[4..];

    let config = WriterConfig {
        capacity,
        max_block,
        ..Default::default()
    };
    let sink = MemorySink::new();
    let writer = match CoalescingWriter::with_config(sink.clone(), config) {
        Ok(writer) => writer,
        Err(_) => return,
    };

    let mid = payload.len() / (2 * chunk_hint);
    for (i, chunk) in payload.chunks(chunk_hint).enumerate() {
        writer.write(chunk).unwrap();
        if i == mid {
            // A barrier in the middle must not disturb later bytes.
            writer.flush().unwrap();
        }
    }
    writer.write(&[]).unwrap();
    writer.close().unwrap();

    assert_eq!(sink.contents(), payload);
    assert!(sink.is_closed());
});
