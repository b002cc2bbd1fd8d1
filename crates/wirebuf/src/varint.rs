//! Base-128 varints.
//!
//! Values are emitted seven bits at a time, least significant group first.
//! Every byte but the last carries the continuation bit `0x80`. Signed values
//! go through the zigzag mapping first so that small magnitudes stay short.
//!
//! A 32-bit varint is at most [`MAX_VARINT32_BYTES`] long and a 64-bit one at
//! most [`MAX_VARINT64_BYTES`]. Payload bits in the last permitted byte that
//! do not fit the target width are discarded; a continuation bit on that byte
//! makes the varint malformed.

use crate::{
    ByteBuffer, Decoded,
    error::{BufferError, Malformation, Result},
};

/// Maximum encoded length of a 32-bit varint.
pub const MAX_VARINT32_BYTES: usize = 5;

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT64_BYTES: usize = 10;

/// Number of bytes `value` occupies as a varint32.
pub fn calculate_varint32(value: u32) -> usize {
    calculate_varint64(u64::from(value))
}

/// Number of bytes `value` occupies as a varint64.
pub fn calculate_varint64(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()).max(1) as usize;
    bits.div_ceil(7)
}

#[allow(clippy::cast_sign_loss)]
pub fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[allow(clippy::cast_possible_wrap)]
pub fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[allow(clippy::cast_sign_loss)]
pub fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[allow(clippy::cast_possible_wrap)]
pub fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Encodes `value` into `out`, returning the number of bytes used.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_varint(mut value: u64, out: &mut [u8; MAX_VARINT64_BYTES]) -> usize {
    let mut len = 0;
    while value >= 0x80 {
        out[len] = ((value as u8) & 0x7F) | 0x80;
        value >>= 7;
        len += 1;
    }
    out[len] = value as u8;
    len + 1
}

/// Decodes a varint of at most `max_bytes` bytes starting at `src[offset]`.
///
/// The accumulator is 64 bits wide; callers decoding a varint32 truncate the
/// result. Running off the end of `src` while the continuation bit is set is
/// [`BufferError::Truncated`]; a continuation bit on byte `max_bytes` is
/// [`Malformation::VarintTooLong`].
pub fn decode_varint(src: &[u8], offset: usize, max_bytes: usize) -> Result<Decoded<u64>> {
    let mut value = 0u64;
    for i in 0..max_bytes {
        let pos = offset.saturating_add(i);
        let Some(&byte) = src.get(pos) else {
            return Err(BufferError::Truncated { offset: pos });
        };
        // Shifts stay below 64 for up to ten bytes; overflowing bits drop out.
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Decoded::new(value, i + 1));
        }
    }
    Err(BufferError::malformed(
        offset,
        Malformation::VarintTooLong { max: max_bytes },
    ))
}

impl ByteBuffer {
    fn write_varint_at(&mut self, value: u64, offset: usize) -> Result<usize> {
        let mut out = [0u8; MAX_VARINT64_BYTES];
        let len = encode_varint(value, &mut out);
        self.prepare_write(offset, len)?;
        self.storage.write_from(offset, &out[..len])?;
        Ok(len)
    }

    fn read_varint_at(&self, offset: usize, max_bytes: usize) -> Result<Decoded<u64>> {
        self.check_read_start(offset)?;
        self.with_readable(|src| decode_varint(src, offset, max_bytes))
    }

    pub fn write_varint32(&mut self, value: u32) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_varint32_at(value, at))
    }

    pub fn write_varint32_at(&mut self, value: u32, offset: usize) -> Result<usize> {
        self.write_varint_at(u64::from(value), offset)
    }

    pub fn read_varint32(&mut self) -> Result<u32> {
        self.consume_with(Self::read_varint32_at)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn read_varint32_at(&self, offset: usize) -> Result<Decoded<u32>> {
        Ok(self
            .read_varint_at(offset, MAX_VARINT32_BYTES)?
            .map(|v| v as u32))
    }

    pub fn write_zigzag_varint32(&mut self, value: i32) -> Result<&mut Self> {
        self.write_varint32(zigzag_encode32(value))
    }

    pub fn write_zigzag_varint32_at(&mut self, value: i32, offset: usize) -> Result<usize> {
        self.write_varint32_at(zigzag_encode32(value), offset)
    }

    pub fn read_zigzag_varint32(&mut self) -> Result<i32> {
        self.consume_with(Self::read_zigzag_varint32_at)
    }

    pub fn read_zigzag_varint32_at(&self, offset: usize) -> Result<Decoded<i32>> {
        Ok(self.read_varint32_at(offset)?.map(zigzag_decode32))
    }

    pub fn write_varint64(&mut self, value: u64) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_varint64_at(value, at))
    }

    pub fn write_varint64_at(&mut self, value: u64, offset: usize) -> Result<usize> {
        self.write_varint_at(value, offset)
    }

    pub fn read_varint64(&mut self) -> Result<u64> {
        self.consume_with(Self::read_varint64_at)
    }

    pub fn read_varint64_at(&self, offset: usize) -> Result<Decoded<u64>> {
        self.read_varint_at(offset, MAX_VARINT64_BYTES)
    }

    pub fn write_zigzag_varint64(&mut self, value: i64) -> Result<&mut Self> {
        self.write_varint64(zigzag_encode64(value))
    }

    pub fn write_zigzag_varint64_at(&mut self, value: i64, offset: usize) -> Result<usize> {
        self.write_varint64_at(zigzag_encode64(value), offset)
    }

    pub fn read_zigzag_varint64(&mut self) -> Result<i64> {
        self.consume_with(Self::read_zigzag_varint64_at)
    }

    pub fn read_zigzag_varint64_at(&self, offset: usize) -> Result<Decoded<i64>> {
        Ok(self.read_varint64_at(offset)?.map(zigzag_decode64))
    }
}
