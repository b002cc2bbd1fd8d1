#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use wirebuf::{BufferOptions, ByteBuffer, Endianness, Metrics, Result};

const HEADER: usize = 5; // 1 flag + 4-byte seed

/// One record of the fuzzed wire format: a 32-bit prefixed string followed by
/// a varint prefixed one.
fn read_record(buf: &mut ByteBuffer) -> Result<(String, String)> {
    let first = buf.read_istring()?;
    let second = buf.read_vstring()?;
    Ok((first, second))
}

/// Decodes records from the whole input until the first error.
fn decode_whole(payload: &[u8], options: BufferOptions) -> (Vec<(String, String)>, bool) {
    let mut buf = ByteBuffer::wrap(payload, options);
    let mut records = Vec::new();
    loop {
        match read_record(&mut buf) {
            Ok(record) => records.push(record),
            Err(err) => return (records, err.is_truncated()),
        }
    }
}

/// Feeds the input in seeded random chunks, retrying truncated records.
fn decode_chunked(
    payload: &[u8],
    options: BufferOptions,
    seed: u64,
) -> (Vec<(String, String)>, bool) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut inbox = ByteBuffer::with_options(BufferOptions {
        capacity: 0,
        ..options
    });
    let mut records = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        let take = rng.random_range(1..=rest.len().min(64));
        let (chunk, tail) = rest.split_at(take);
        rest = tail;

        let end = inbox.limit();
        inbox.write_bytes_at(chunk, end).unwrap();
        inbox.set_limit(end + chunk.len());
        loop {
            inbox.mark();
            match read_record(&mut inbox) {
                Ok(record) => records.push(record),
                Err(err) if err.is_truncated() => {
                    inbox.restore_mark();
                    break;
                }
                Err(_) => return (records, false),
            }
        }
        inbox.compact().unwrap();
    }
    (records, true)
}

/// Every codec must reject garbage with an error instead of panicking.
fn poke_decoders(payload: &[u8], options: BufferOptions) {
    let buf = ByteBuffer::wrap(payload, options);
    for offset in 0..payload.len().min(16) {
        let _ = buf.read_varint32_at(offset);
        let _ = buf.read_zigzag_varint64_at(offset);
        let _ = buf.read_cstring_at(offset);
        let _ = buf.read_utf8_string_at(payload.len(), Metrics::Chars, offset);
        let _ = buf.read_utf8_string_at(payload.len() - offset, Metrics::Bytes, offset);
        let _ = buf.read_f64_at(offset);
    }
    let mut copy = buf.copy();
    copy.reverse();
    let _ = copy.compact_range(payload.len() / 3, payload.len() / 2);
}

fn decode(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let seed = u64::from(u32::from_le_bytes(data[1..HEADER].try_into().unwrap()));
    let payload = &data[HEADER..];

    let options = BufferOptions {
        endianness: if flags & 1 != 0 {
            Endianness::Little
        } else {
            Endianness::Big
        },
        no_assert: flags & 2 != 0,
        ..Default::default()
    };
    poke_decoders(payload, options);

    // Unchecked buffers read into spare capacity, so only checked ones are
    // expected to agree across chunkings.
    let options = BufferOptions {
        no_assert: false,
        ..options
    };
    let (whole, whole_truncated) = decode_whole(payload, options);
    let (chunked, chunked_truncated) = decode_chunked(payload, options, seed);
    assert_eq!(whole, chunked);
    assert_eq!(whole_truncated, chunked_truncated);
}

fuzz_target!(|data: &[u8]| decode(data));
