//! String framings on top of the UTF-8 codec.
//!
//! | framing        | layout                                      |
//! |----------------|---------------------------------------------|
//! | UTF-8 string   | raw bytes, the reader supplies the length    |
//! | C string       | raw bytes, then `0x00`                       |
//! | I string       | `u32` byte length (buffer byte order), bytes |
//! | V string       | varint32 byte length, bytes                  |
//!
//! Absolute writes return the number of bytes written including any prefix
//! or terminator; absolute reads report the same count in
//! [`Decoded::length`].

use alloc::{format, string::String, vec::Vec};

use crate::{
    BufferOptions, ByteBuffer, Decoded, Metrics,
    error::{BufferError, Malformation, Result},
    utf8::{self, decode_code_point},
    varint::{MAX_VARINT32_BYTES, calculate_varint32, decode_varint},
};

const ISTRING_PREFIX: usize = size_of::<u32>();

/// Decodes the code points of `src[begin..end]`, handing each to `sink`
/// together with its offset.
///
/// A window reaching past `src` is truncated; a code point straddling `end`
/// is malformed.
fn decode_byte_window(
    src: &[u8],
    begin: usize,
    end: usize,
    mut sink: impl FnMut(u32, usize) -> Result<()>,
) -> Result<()> {
    if end > src.len() {
        return Err(BufferError::Truncated { offset: src.len() });
    }
    let window = &src[..end];
    let mut pos = begin;
    while pos < end {
        let decoded = decode_code_point(window, pos).map_err(|err| match err {
            BufferError::Truncated { .. } => {
                BufferError::malformed(pos, Malformation::SplitCodePoint)
            }
            other => other,
        })?;
        sink(decoded.value, pos)?;
        pos += decoded.length;
    }
    Ok(())
}

/// Decodes `count` code points starting at `src[begin]`, returning the end
/// offset.
fn decode_char_window(
    src: &[u8],
    begin: usize,
    count: usize,
    mut sink: impl FnMut(u32, usize) -> Result<()>,
) -> Result<usize> {
    let mut pos = begin;
    for _ in 0..count {
        let decoded = decode_code_point(src, pos)?;
        sink(decoded.value, pos)?;
        pos += decoded.length;
    }
    Ok(pos)
}

fn push_char(out: &mut String, code_point: u32, at: usize) -> Result<()> {
    let c = char::from_u32(code_point).ok_or(BufferError::malformed(
        at,
        Malformation::CodePointOutOfRange(code_point),
    ))?;
    out.push(c);
    Ok(())
}

fn string_len_u32(text: &str) -> Result<u32> {
    u32::try_from(text.len()).map_err(|_| {
        BufferError::InvalidArgument(format!(
            "string of {} bytes does not fit a 32-bit length prefix",
            text.len()
        ))
    })
}

impl ByteBuffer {
    /// Allocates a buffer holding exactly the UTF-8 bytes of `text`, ready to
    /// be read (`offset = 0`, `limit = capacity`).
    pub fn from_utf8(text: &str, options: BufferOptions) -> Self {
        Self::wrap(text.as_bytes(), options)
    }

    /// Writes the UTF-8 bytes of `text` without any framing.
    pub fn write_utf8_string(&mut self, text: &str) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_utf8_string_at(text, at))
    }

    pub fn write_utf8_string_at(&mut self, text: &str, offset: usize) -> Result<usize> {
        self.prepare_write(offset, text.len())?;
        self.storage.write_from(offset, text.as_bytes())?;
        Ok(text.len())
    }

    /// Reads `length` code points or bytes, depending on `metrics`.
    ///
    /// With [`Metrics::Bytes`] the window must end on a code point boundary,
    /// otherwise the read fails with [`Malformation::SplitCodePoint`].
    pub fn read_utf8_string(&mut self, length: usize, metrics: Metrics) -> Result<String> {
        self.consume_with(|buf, at| buf.read_utf8_string_at(length, metrics, at))
    }

    pub fn read_utf8_string_at(
        &self,
        length: usize,
        metrics: Metrics,
        offset: usize,
    ) -> Result<Decoded<String>> {
        self.check_read_start(offset)?;
        let mut out = String::new();
        let end = self.with_readable(|src| match metrics {
            Metrics::Chars => {
                decode_char_window(src, offset, length, |cp, at| push_char(&mut out, cp, at))
            }
            Metrics::Bytes => {
                let end = offset.saturating_add(length);
                decode_byte_window(src, offset, end, |cp, at| push_char(&mut out, cp, at))
                    .map(|()| end)
            }
        })?;
        Ok(Decoded::new(out, end - offset))
    }

    /// Transcodes UTF-16 `units` to UTF-8 and writes them without framing.
    /// Surrogate pairs become one four-byte sequence.
    pub fn write_utf16_as_utf8(&mut self, units: &[u16]) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_utf16_as_utf8_at(units, at))
    }

    pub fn write_utf16_as_utf8_at(&mut self, units: &[u16], offset: usize) -> Result<usize> {
        let len = utf8::utf8_byte_length_utf16(units)?;
        self.prepare_write(offset, len)?;
        let mut pos = offset;
        let mut scratch = [0u8; 4];
        for cp in utf8::utf16_to_code_points(units) {
            let n = utf8::encode_code_point(cp?, &mut scratch)?;
            self.storage.write_from(pos, &scratch[..n])?;
            pos += n;
        }
        Ok(len)
    }

    /// Reads UTF-8 like [`read_utf8_string`](Self::read_utf8_string) but
    /// returns UTF-16 code units, splitting code points above `U+FFFF` into
    /// surrogate pairs.
    pub fn read_utf8_as_utf16(&mut self, length: usize, metrics: Metrics) -> Result<Vec<u16>> {
        self.consume_with(|buf, at| buf.read_utf8_as_utf16_at(length, metrics, at))
    }

    pub fn read_utf8_as_utf16_at(
        &self,
        length: usize,
        metrics: Metrics,
        offset: usize,
    ) -> Result<Decoded<Vec<u16>>> {
        self.check_read_start(offset)?;
        let mut out = Vec::new();
        let end = self.with_readable(|src| match metrics {
            Metrics::Chars => decode_char_window(src, offset, length, |cp, _| {
                utf8::push_code_point_utf16(cp, &mut out)
            }),
            Metrics::Bytes => {
                let end = offset.saturating_add(length);
                decode_byte_window(src, offset, end, |cp, _| {
                    utf8::push_code_point_utf16(cp, &mut out)
                })
                .map(|()| end)
            }
        })?;
        Ok(Decoded::new(out, end - offset))
    }

    /// Writes `text` followed by a NUL terminator.
    ///
    /// Unless assertions are disabled, `text` must not contain `U+0000`; the
    /// check runs before anything is written.
    pub fn write_cstring(&mut self, text: &str) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_cstring_at(text, at))
    }

    pub fn write_cstring_at(&mut self, text: &str, offset: usize) -> Result<usize> {
        if !self.no_assert {
            if let Some(nul) = text.bytes().position(|b| b == 0) {
                return Err(BufferError::malformed(
                    offset.saturating_add(nul),
                    Malformation::EmbeddedNul,
                ));
            }
        }
        let total = text.len() + 1;
        self.prepare_write(offset, total)?;
        self.storage.write_from(offset, text.as_bytes())?;
        self.storage.set_u8(offset + text.len(), 0)?;
        Ok(total)
    }

    /// Reads up to the next NUL byte. The terminator is consumed but not part
    /// of the result.
    pub fn read_cstring(&mut self) -> Result<String> {
        self.consume_with(Self::read_cstring_at)
    }

    pub fn read_cstring_at(&self, offset: usize) -> Result<Decoded<String>> {
        self.check_read_start(offset)?;
        let mut out = String::new();
        let nul = self.with_readable(|src| -> Result<usize> {
            let tail = src.get(offset..).unwrap_or_default();
            let nul = tail
                .iter()
                .position(|&b| b == 0)
                .map(|i| offset + i)
                .ok_or(BufferError::Truncated {
                    offset: src.len().max(offset),
                })?;
            decode_byte_window(src, offset, nul, |cp, at| push_char(&mut out, cp, at))?;
            Ok(nul)
        })?;
        Ok(Decoded::new(out, nul - offset + 1))
    }

    /// Writes a 32-bit byte length in the buffer's byte order, then `text`.
    pub fn write_istring(&mut self, text: &str) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_istring_at(text, at))
    }

    pub fn write_istring_at(&mut self, text: &str, offset: usize) -> Result<usize> {
        let len = string_len_u32(text)?;
        let total = ISTRING_PREFIX + text.len();
        self.prepare_write(offset, total)?;
        self.write_u32_at(len, offset)?;
        self.storage.write_from(offset + ISTRING_PREFIX, text.as_bytes())?;
        Ok(total)
    }

    pub fn read_istring(&mut self) -> Result<String> {
        self.consume_with(Self::read_istring_at)
    }

    pub fn read_istring_at(&self, offset: usize) -> Result<Decoded<String>> {
        self.check_read_start(offset)?;
        let body = offset.saturating_add(ISTRING_PREFIX);
        let readable = self.readable_end();
        if body > readable {
            return Err(BufferError::Truncated {
                offset: readable.max(offset),
            });
        }
        let len = self.read_u32_at(offset)? as usize;
        self.read_prefixed_body(offset, body, len)
    }

    /// Writes a varint32 byte length, then `text`.
    pub fn write_vstring(&mut self, text: &str) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_vstring_at(text, at))
    }

    pub fn write_vstring_at(&mut self, text: &str, offset: usize) -> Result<usize> {
        let len = string_len_u32(text)?;
        let prefix = calculate_varint32(len);
        let total = prefix + text.len();
        self.prepare_write(offset, total)?;
        self.write_varint32_at(len, offset)?;
        self.storage.write_from(offset + prefix, text.as_bytes())?;
        Ok(total)
    }

    pub fn read_vstring(&mut self) -> Result<String> {
        self.consume_with(Self::read_vstring_at)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn read_vstring_at(&self, offset: usize) -> Result<Decoded<String>> {
        self.check_read_start(offset)?;
        let prefix = self.with_readable(|src| decode_varint(src, offset, MAX_VARINT32_BYTES))?;
        let len = prefix.value as u32 as usize;
        self.read_prefixed_body(offset, offset + prefix.length, len)
    }

    fn read_prefixed_body(
        &self,
        offset: usize,
        body: usize,
        len: usize,
    ) -> Result<Decoded<String>> {
        let end = body.saturating_add(len);
        let mut out = String::new();
        self.with_readable(|src| {
            decode_byte_window(src, body, end, |cp, at| push_char(&mut out, cp, at))
        })?;
        Ok(Decoded::new(out, end - offset))
    }
}
