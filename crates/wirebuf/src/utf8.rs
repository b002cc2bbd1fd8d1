//! Code point level UTF-8 codec.
//!
//! Encoding takes a Unicode scalar value (`0..=0x10FFFF`, excluding the
//! surrogate block) and produces one to four bytes:
//!
//! | code point          | bytes                                 |
//! |---------------------|---------------------------------------|
//! | `U+0000..U+007F`    | `0xxxxxxx`                            |
//! | `U+0080..U+07FF`    | `110xxxxx 10xxxxxx`                   |
//! | `U+0800..U+FFFF`    | `1110xxxx 10xxxxxx 10xxxxxx`          |
//! | `U+10000..U+10FFFF` | `11110xxx 10xxxxxx 10xxxxxx 10xxxxxx` |
//!
//! Decoding is strict: the legacy five and six byte forms, overlong
//! encodings, encoded surrogates and values above `U+10FFFF` are rejected as
//! malformed. A sequence that is well-formed so far but cut off by the end of
//! the readable input is reported as truncated instead, so a streaming caller
//! can wait for more bytes.
//!
//! Hosts that hand over UTF-16 text can use [`utf16_to_code_points`] and
//! [`push_code_point_utf16`] to move between code units and code points.

use alloc::{format, vec::Vec};

use crate::{
    Decoded,
    error::{BufferError, Malformation, Result},
};

/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

const SURROGATES: core::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;
const HIGH_SURROGATES: core::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATES: core::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// Number of bytes `code_point` occupies once encoded.
pub fn code_point_len(code_point: u32) -> Result<usize> {
    check_scalar(code_point)?;
    Ok(match code_point {
        0..0x80 => 1,
        0x80..0x800 => 2,
        0x800..0x1_0000 => 3,
        _ => 4,
    })
}

/// Encodes one code point into `out`, returning the number of bytes used.
///
/// # Errors
///
/// [`BufferError::InvalidArgument`] for surrogates and values above
/// [`MAX_CODE_POINT`].
#[allow(clippy::cast_possible_truncation)]
pub fn encode_code_point(code_point: u32, out: &mut [u8; 4]) -> Result<usize> {
    let cp = code_point;
    let len = code_point_len(cp)?;
    match len {
        1 => out[0] = cp as u8,
        2 => {
            out[0] = 0xC0 | (cp >> 6) as u8;
            out[1] = 0x80 | (cp & 0x3F) as u8;
        }
        3 => {
            out[0] = 0xE0 | (cp >> 12) as u8;
            out[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            out[2] = 0x80 | (cp & 0x3F) as u8;
        }
        _ => {
            out[0] = 0xF0 | (cp >> 18) as u8;
            out[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            out[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            out[3] = 0x80 | (cp & 0x3F) as u8;
        }
    }
    Ok(len)
}

/// Sequence length announced by a leading byte, or `None` if `lead` cannot
/// start a sequence.
pub fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        // 10xxxxxx continuation bytes and the 5/6-byte legacy forms.
        _ => None,
    }
}

/// Decodes the code point starting at `src[offset]`.
///
/// `src` is the readable input; its length is the point at which data runs
/// out. Error offsets are indices into `src`.
pub fn decode_code_point(src: &[u8], offset: usize) -> Result<Decoded<u32>> {
    let Some(&lead) = src.get(offset) else {
        return Err(BufferError::Truncated { offset });
    };
    let len = sequence_len(lead)
        .ok_or_else(|| BufferError::malformed(offset, Malformation::InvalidLeadByte(lead)))?;
    if len == 1 {
        return Ok(Decoded::new(u32::from(lead), 1));
    }

    let mut cp = u32::from(lead) & (0x7F >> len);
    for i in 1..len {
        let Some(&byte) = src.get(offset + i) else {
            return Err(BufferError::Truncated { offset: offset + i });
        };
        if byte & 0xC0 != 0x80 {
            return Err(BufferError::malformed(
                offset + i,
                Malformation::InvalidContinuation(byte),
            ));
        }
        cp = (cp << 6) | u32::from(byte & 0x3F);
    }

    let min = match len {
        2 => 0x80,
        3 => 0x800,
        _ => 0x1_0000,
    };
    if cp < min {
        return Err(BufferError::malformed(offset, Malformation::Overlong(cp)));
    }
    if SURROGATES.contains(&cp) {
        return Err(BufferError::malformed(offset, Malformation::Surrogate(cp)));
    }
    if cp > MAX_CODE_POINT {
        return Err(BufferError::malformed(
            offset,
            Malformation::CodePointOutOfRange(cp),
        ));
    }
    Ok(Decoded::new(cp, len))
}

/// Number of bytes `text` occupies as UTF-8, computed code point by code
/// point without allocating.
pub fn utf8_byte_length(text: &str) -> usize {
    text.chars().map(char::len_utf8).sum()
}

/// Number of code points in `text`.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Iterates the code points of UTF-16 `units`, joining surrogate pairs.
///
/// A high surrogate followed by a low surrogate yields one code point above
/// `U+FFFF`. An unpaired surrogate yields [`BufferError::InvalidArgument`].
pub fn utf16_to_code_points(units: &[u16]) -> impl Iterator<Item = Result<u32>> + '_ {
    let mut i = 0;
    core::iter::from_fn(move || {
        let unit = *units.get(i)?;
        i += 1;
        if HIGH_SURROGATES.contains(&unit) {
            if let Some(&low) = units.get(i) {
                if LOW_SURROGATES.contains(&low) {
                    i += 1;
                    let cp = 0x1_0000
                        + ((u32::from(unit) - 0xD800) << 10)
                        + (u32::from(low) - 0xDC00);
                    return Some(Ok(cp));
                }
            }
            return Some(Err(unpaired(i - 1, unit)));
        }
        if LOW_SURROGATES.contains(&unit) {
            return Some(Err(unpaired(i - 1, unit)));
        }
        Some(Ok(u32::from(unit)))
    })
}

/// Appends `code_point` to `out` as one UTF-16 code unit, or as a surrogate
/// pair when it lies above `U+FFFF`.
#[allow(clippy::cast_possible_truncation)]
pub fn push_code_point_utf16(code_point: u32, out: &mut Vec<u16>) -> Result<()> {
    check_scalar(code_point)?;
    if code_point < 0x1_0000 {
        out.push(code_point as u16);
    } else {
        let v = code_point - 0x1_0000;
        out.push(0xD800 | (v >> 10) as u16);
        out.push(0xDC00 | (v & 0x3FF) as u16);
    }
    Ok(())
}

/// Number of bytes UTF-16 `units` occupy once transcoded to UTF-8.
pub fn utf8_byte_length_utf16(units: &[u16]) -> Result<usize> {
    utf16_to_code_points(units).try_fold(0, |n, cp| Ok(n + code_point_len(cp?)?))
}

fn check_scalar(code_point: u32) -> Result<()> {
    if code_point > MAX_CODE_POINT {
        return Err(BufferError::InvalidArgument(format!(
            "code point 0x{code_point:X} exceeds U+10FFFF"
        )));
    }
    if SURROGATES.contains(&code_point) {
        return Err(BufferError::InvalidArgument(format!(
            "surrogate U+{code_point:04X} is not a scalar value"
        )));
    }
    Ok(())
}

fn unpaired(index: usize, unit: u16) -> BufferError {
    BufferError::InvalidArgument(format!(
        "unpaired surrogate 0x{unit:04X} at code unit {index}"
    ))
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use rstest::rstest;

    use super::*;
    use crate::ErrorKind;

    #[rstest]
    #[case(0x00, &[0x00])]
    #[case(0x7F, &[0x7F])]
    #[case(0x80, &[0xC2, 0x80])]
    #[case(0x7FF, &[0xDF, 0xBF])]
    #[case(0x800, &[0xE0, 0xA0, 0x80])]
    #[case(0xFFFF, &[0xEF, 0xBF, 0xBF])]
    #[case(0x1_0000, &[0xF0, 0x90, 0x80, 0x80])]
    #[case(0x10_FFFF, &[0xF4, 0x8F, 0xBF, 0xBF])]
    fn boundary_code_points(#[case] cp: u32, #[case] expected: &[u8]) {
        let mut out = [0u8; 4];
        let len = encode_code_point(cp, &mut out).unwrap();
        assert_eq!(&out[..len], expected);
        assert_eq!(code_point_len(cp).unwrap(), len);

        let decoded = decode_code_point(expected, 0).unwrap();
        assert_eq!(decoded, Decoded::new(cp, len));
    }

    #[test]
    fn encode_rejects_out_of_range_and_surrogates() {
        let mut out = [0u8; 4];
        for cp in [0x11_0000, 0x7FFF_FFFF, u32::MAX, 0xD800, 0xDFFF] {
            let err = encode_code_point(cp, &mut out).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "cp {cp:X}");
        }
    }

    #[rstest]
    #[case(&[0xFE, 0, 0, 0, 0, 0], Malformation::InvalidLeadByte(0xFE))]
    #[case(&[0xF8, 0x88, 0x80, 0x80, 0x80], Malformation::InvalidLeadByte(0xF8))]
    #[case(&[0xFC, 0x84, 0x80, 0x80, 0x80, 0x80], Malformation::InvalidLeadByte(0xFC))]
    #[case(&[0x80], Malformation::InvalidLeadByte(0x80))]
    #[case(&[0xC0, 0x80], Malformation::Overlong(0))]
    #[case(&[0xE0, 0x80, 0xAF], Malformation::Overlong(0x2F))]
    #[case(&[0xED, 0xA0, 0x80], Malformation::Surrogate(0xD800))]
    #[case(&[0xF4, 0x90, 0x80, 0x80], Malformation::CodePointOutOfRange(0x11_0000))]
    fn malformed_sequences(#[case] src: &[u8], #[case] reason: Malformation) {
        let err = decode_code_point(src, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(matches!(err, BufferError::Malformed { reason: r, .. } if r == reason));
    }

    #[test]
    fn non_continuation_byte_is_malformed_not_truncated() {
        let err = decode_code_point(&[0xE2, 0x41], 0).unwrap_err();
        assert_eq!(
            err,
            BufferError::malformed(1, Malformation::InvalidContinuation(0x41))
        );
    }

    #[test]
    fn cut_off_sequence_is_truncated() {
        let err = decode_code_point(&[0xF0, 0x9F, 0x98], 0).unwrap_err();
        assert_eq!(err, BufferError::Truncated { offset: 3 });
        assert!(err.is_truncated());
        assert!(decode_code_point(&[], 0).unwrap_err().is_truncated());
    }

    #[test]
    fn byte_length_matches_std() {
        for s in ["", "abc", "åβ👍", "\u{0}\u{7FF}\u{800}\u{10FFFF}"] {
            assert_eq!(utf8_byte_length(s), s.len());
        }
        assert_eq!(char_count("åβ👍"), 3);
    }

    #[test]
    fn surrogate_pairs_round_trip() {
        let text = "a😀b\u{10FFFF}";
        let units: Vec<u16> = text.encode_utf16().collect();
        let cps: Vec<u32> = utf16_to_code_points(&units)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(cps, vec![0x61, 0x1F600, 0x62, 0x10_FFFF]);

        let mut back = Vec::new();
        for cp in cps {
            push_code_point_utf16(cp, &mut back).unwrap();
        }
        assert_eq!(back, units);
        assert_eq!(utf8_byte_length_utf16(&units).unwrap(), text.len());
    }

    #[test]
    fn unpaired_surrogates_are_rejected() {
        for units in [&[0xD83D_u16][..], &[0xDE00, 0x61][..], &[0xD83D, 0x61][..]] {
            let first_err = utf16_to_code_points(units).find_map(Result::err);
            assert_eq!(
                first_err.map(|e| e.kind()),
                Some(ErrorKind::InvalidArgument)
            );
        }
    }
}
