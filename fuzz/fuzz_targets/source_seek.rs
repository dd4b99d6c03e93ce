#![no_main]

use std::io::{Read, Seek, SeekFrom};

use libfuzzer_sys::fuzz_target;
use shuttlebuf::{NullSource, RandomSource};

fn position<S: Seek>(src: &mut S) -> u64 {
    src.seek(SeekFrom::Current(0)).unwrap()
}

/// Every seek either lands exactly on its computed target or fails and
/// leaves the position untouched. Negative targets and targets past the end
/// must fail, never wrap.
fn check_seek<S: Seek>(src: &mut S, len: u64, from: SeekFrom) {
    let before = position(src);
    let target: i128 = match from {
        SeekFrom::Start(s) => s as i128,
        SeekFrom::Current(d) => before as i128 + d as i128,
        SeekFrom::End(d) => len as i128 + d as i128,
    };
    let valid = target >= 0 && target <= len as i128;
    match src.seek(from) {
        Ok(v) => {
            assert!(valid, "seek accepted an out-of-range target {target}");
            assert_eq!(v as i128, target);
            assert_eq!(position(src), v);
        }
        Err(_) => {
            assert!(!valid, "seek rejected an in-range target {target}");
            assert_eq!(position(src), before);
        }
    }
}

fn drive<S: Read + Seek>(mut src: S, len: u64, ops: &[u8], verify: impl Fn(u64, &[u8])) {
    let mut buf = [0u8; 256];
    for op in ops.chunks_exact(3) {
        let arg = u16::from_le_bytes([op[1], op[2]]);
        match op[0] % 4 {
            0 => {
                let want = (arg as usize % buf.len()) + 1;
                let before = position(&mut src);
                let n = src.read(&mut buf[..want]).unwrap();
                assert_eq!(n as u64, (len - before).min(want as u64));
                assert_eq!(position(&mut src), before + n as u64);
                verify(before, &buf[..n]);
            }
            1 => check_seek(&mut src, len, SeekFrom::Start(arg as u64)),
            2 => check_seek(&mut src, len, SeekFrom::Current(arg as i64 - 0x8000)),
            _ => check_seek(&mut src, len, SeekFrom::End(arg as i64 - 0x8000)),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    // First two bytes pick the source length, the rest is an op stream of
    // (kind, arg) triples: reads of arbitrary sizes interleaved with seeks
    // from all three anchors, including out-of-range ones.
    if data.len() < 2 {
        return;
    }
    let len = u16::from_le_bytes([data[0], data[1]]) as u64;
    let ops = &data[2..];

    drive(NullSource::new(len), len, ops, |_, bytes| {
        assert!(bytes.iter().all(|&b| b == 0));
    });

    // A fresh source seeked to the same position must reproduce the bytes:
    // the random pool is stable within the process.
    drive(RandomSource::new(len), len, ops, |at, bytes| {
        let mut fresh = RandomSource::new(len);
        fresh.seek(SeekFrom::Start(at)).unwrap();
        let mut expect = vec![0u8; bytes.len()];
        fresh.read_exact(&mut expect).unwrap();
        assert_eq!(bytes, expect.as_slice());
    });
});
