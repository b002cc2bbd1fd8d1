/// Capacity of a buffer allocated with [`BufferOptions::default`].
pub const DEFAULT_CAPACITY: usize = 32;

/// Byte order applied to every multi-byte primitive of a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    /// Most significant byte first (network order).
    #[default]
    Big,
    Little,
}

impl Endianness {
    pub fn is_little(self) -> bool {
        self == Endianness::Little
    }
}

/// Construction-time configuration of a [`ByteBuffer`](crate::ByteBuffer).
///
/// # Examples
///
/// ```rust
/// use wirebuf::{BufferOptions, ByteBuffer, Endianness};
///
/// let buf = ByteBuffer::with_options(BufferOptions {
///     capacity: 8,
///     endianness: Endianness::Little,
///     ..Default::default()
/// });
/// assert_eq!(buf.capacity(), 8);
/// assert!(buf.endianness().is_little());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferOptions {
    /// Initial storage capacity in bytes. Only used by allocating
    /// constructors; wrapping constructors take the wrapped length.
    ///
    /// # Default
    ///
    /// [`DEFAULT_CAPACITY`]
    pub capacity: usize,

    /// Byte order of multi-byte values, fixed for the lifetime of the buffer.
    ///
    /// # Default
    ///
    /// [`Endianness::Big`]
    pub endianness: Endianness,

    /// Skip argument and range validation.
    ///
    /// Offsets past the capacity, inverted slice ranges and embedded NULs in
    /// C strings are no longer rejected up front. Storage access itself stays
    /// bounds checked, so a bad offset still surfaces as an error on access
    /// rather than as undefined behavior. Variable-length decoders read up to
    /// the capacity instead of stopping at the limit.
    ///
    /// # Default
    ///
    /// `false`
    pub no_assert: bool,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            endianness: Endianness::Big,
            no_assert: false,
        }
    }
}

/// Unit in which [`ByteBuffer::read_utf8_string`](crate::ByteBuffer::read_utf8_string)
/// counts its length argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metrics {
    /// Count Unicode code points.
    #[default]
    Chars,
    /// Count encoded bytes; the range must end on a code point boundary.
    Bytes,
}
