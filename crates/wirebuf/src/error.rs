use alloc::string::String;

use thiserror::Error;

/// Coarse classification of a [`BufferError`].
///
/// Streaming callers usually only need to tell [`ErrorKind::Truncated`] apart
/// from everything else: truncated input may decode once more bytes arrive,
/// any other kind will not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    OutOfRange,
    Malformed,
    Truncated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("index out of range: {offset} + {len} > {capacity}")]
    OutOfRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },
    #[error("illegal range: 0 <= {begin} <= {end} <= {capacity}")]
    IllegalRange {
        begin: usize,
        end: usize,
        capacity: usize,
    },
    #[error("malformed data at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: Malformation },
    #[error("truncated data at offset {offset}")]
    Truncated { offset: usize },
}

/// Why a decoder rejected its input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    #[error("illegal UTF-8 leading byte 0x{0:02X}")]
    InvalidLeadByte(u8),
    #[error("illegal UTF-8 continuation byte 0x{0:02X}")]
    InvalidContinuation(u8),
    #[error("overlong UTF-8 encoding of U+{0:04X}")]
    Overlong(u32),
    #[error("UTF-8 encoded surrogate U+{0:04X}")]
    Surrogate(u32),
    #[error("code point 0x{0:X} is out of range")]
    CodePointOutOfRange(u32),
    #[error("varint exceeds {max} bytes")]
    VarintTooLong { max: usize },
    #[error("string contains a NUL character")]
    EmbeddedNul,
    #[error("byte range ends inside a code point")]
    SplitCodePoint,
    #[error("unexpected symbol {symbol:?} in {encoding} input")]
    InvalidSymbol {
        encoding: &'static str,
        symbol: char,
    },
    #[error("{encoding} input has an invalid length")]
    InvalidLength { encoding: &'static str },
}

impl BufferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BufferError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BufferError::OutOfRange { .. } | BufferError::IllegalRange { .. } => {
                ErrorKind::OutOfRange
            }
            BufferError::Malformed { .. } => ErrorKind::Malformed,
            BufferError::Truncated { .. } => ErrorKind::Truncated,
        }
    }

    /// True when the input ended before a value was complete.
    pub fn is_truncated(&self) -> bool {
        self.kind() == ErrorKind::Truncated
    }

    pub(crate) fn malformed(offset: usize, reason: Malformation) -> Self {
        BufferError::Malformed { offset, reason }
    }

    pub(crate) fn out_of_range(offset: usize, len: usize, capacity: usize) -> Self {
        BufferError::OutOfRange {
            offset,
            len,
            capacity,
        }
    }
}

pub type Result<T, E = BufferError> = core::result::Result<T, E>;
