//! The cursor layered over [`Storage`].
//!
//! Every codec primitive comes as a pair:
//!
//! - a *relative* operation (`write_u32`, `read_u32`, ...) that starts at
//!   [`ByteBuffer::offset`] and advances it by the number of bytes consumed or
//!   produced. Writes return `&mut Self` so they chain.
//! - an *absolute* operation (`write_u32_at`, `read_u32_at`, ...) that takes
//!   an explicit offset and leaves the cursor alone. Writes return the number
//!   of bytes written; variable-length reads return a [`Decoded`] carrying the
//!   byte length next to the value.
//!
//! Writes grow the storage as needed (see [`ByteBuffer::ensure_capacity`]).
//! Reads never grow anything.

use alloc::vec::Vec;
use core::fmt;

use bstr::BStr;

use crate::{
    error::{BufferError, Result},
    options::{BufferOptions, Endianness},
    storage::Storage,
};

/// A value decoded by an absolute read, together with the number of bytes it
/// occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<T> {
    pub value: T,
    pub length: usize,
}

impl<T> Decoded<T> {
    pub fn new(value: T, length: usize) -> Self {
        Self { value, length }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            length: self.length,
        }
    }
}

/// A growable byte buffer with an implicit read/write cursor.
///
/// Content is conventionally `[offset, limit)` while reading and `[0, offset)`
/// while writing; [`flip`](Self::flip) moves from the latter to the former.
/// Neither `offset` nor `limit` is bounded when assigned: an out-of-range
/// cursor is only reported once an access needs it.
///
/// `Clone` produces another view on the *same* storage with its own cursor.
/// Use [`copy`](Self::copy) for an independent duplicate.
///
/// ```rust
/// use wirebuf::ByteBuffer;
///
/// let mut buf = ByteBuffer::allocate(4);
/// buf.write_u16(0x1234)?.write_u8(0x56)?;
/// buf.flip();
/// assert_eq!(buf.read_u16()?, 0x1234);
/// assert_eq!(buf.remaining(), 1);
/// # Ok::<(), wirebuf::BufferError>(())
/// ```
#[derive(Clone)]
pub struct ByteBuffer {
    pub(crate) storage: Storage,
    pub(crate) offset: usize,
    pub(crate) limit: usize,
    pub(crate) marked_offset: Option<usize>,
    pub(crate) endianness: Endianness,
    pub(crate) no_assert: bool,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteBuffer {
    /// Allocates a buffer with [`BufferOptions::default`].
    pub fn new() -> Self {
        Self::with_options(BufferOptions::default())
    }

    /// Allocates `capacity` zeroed bytes with otherwise default options.
    pub fn allocate(capacity: usize) -> Self {
        Self::with_options(BufferOptions {
            capacity,
            ..Default::default()
        })
    }

    /// Allocates fresh storage of `options.capacity` bytes; `offset` and
    /// `limit` start at zero.
    pub fn with_options(options: BufferOptions) -> Self {
        Self::over(Storage::new(options.capacity), options)
    }

    /// Adopts `bytes` as storage without copying. `offset` is zero and
    /// `limit` is the length of `bytes`; `options.capacity` is ignored.
    pub fn wrap(bytes: impl Into<Vec<u8>>, options: BufferOptions) -> Self {
        Self::wrap_storage(Storage::from(bytes.into()), options)
    }

    /// Adopts an existing, possibly shared, storage handle.
    pub fn wrap_storage(storage: Storage, options: BufferOptions) -> Self {
        let mut buf = Self::over(storage, options);
        buf.limit = buf.capacity();
        buf
    }

    /// Another view on `other`'s storage with the same offset and limit but
    /// no mark.
    pub fn wrap_buffer(other: &ByteBuffer) -> Self {
        let mut buf = other.clone();
        buf.marked_offset = None;
        buf
    }

    fn over(storage: Storage, options: BufferOptions) -> Self {
        Self {
            storage,
            offset: 0,
            limit: 0,
            marked_offset: None,
            endianness: options.endianness,
            no_assert: options.no_assert,
        }
    }

    /// Options equivalent to this buffer's configuration, with the current
    /// capacity.
    pub fn options(&self) -> BufferOptions {
        BufferOptions {
            capacity: self.capacity(),
            endianness: self.endianness,
            no_assert: self.no_assert,
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn no_assert(&self) -> bool {
        self.no_assert
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes between `offset` and `limit`; zero if the cursor is past the
    /// limit.
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.offset)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// True if both buffers are views on the same storage block.
    pub fn shares_storage_with(&self, other: &ByteBuffer) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// Saves the current offset.
    pub fn mark(&mut self) -> &mut Self {
        self.marked_offset = Some(self.offset);
        self
    }

    /// Saves an explicit offset.
    pub fn mark_at(&mut self, offset: usize) -> &mut Self {
        self.marked_offset = Some(offset);
        self
    }

    pub fn marked_offset(&self) -> Option<usize> {
        self.marked_offset
    }

    /// Moves the cursor back to the saved mark and clears it. Without a mark
    /// the cursor rewinds to zero.
    pub fn restore_mark(&mut self) -> &mut Self {
        self.offset = self.marked_offset.take().unwrap_or(0);
        self
    }

    /// Moves the cursor by `delta` bytes in either direction.
    pub fn skip(&mut self, delta: isize) -> Result<&mut Self> {
        let target = self.offset.checked_add_signed(delta);
        match target {
            Some(offset) if self.no_assert || offset <= self.capacity() => {
                self.offset = offset;
                Ok(self)
            }
            _ => Err(BufferError::out_of_range(
                self.offset,
                delta.unsigned_abs(),
                self.capacity(),
            )),
        }
    }

    /// `limit = offset; offset = 0`: switches from writing to reading what was
    /// written.
    pub fn flip(&mut self) -> &mut Self {
        self.limit = self.offset;
        self.offset = 0;
        self
    }

    /// `offset = 0; limit = 0`.
    pub fn reset(&mut self) -> &mut Self {
        self.offset = 0;
        self.limit = 0;
        self
    }

    /// Grows the storage to at least `min_capacity` bytes. Doubles the
    /// current capacity unless that is still too small, in which case exactly
    /// `min_capacity` is used.
    pub fn ensure_capacity(&mut self, min_capacity: usize) -> &mut Self {
        let capacity = self.capacity();
        if capacity < min_capacity {
            let doubled = capacity.saturating_mul(2);
            self.resize(doubled.max(min_capacity));
        }
        self
    }

    /// Grows the storage to exactly `capacity` bytes if it is smaller.
    ///
    /// Aliases of a shared block keep the old block; only this view moves to
    /// the grown one.
    pub fn resize(&mut self, capacity: usize) -> &mut Self {
        self.storage.resize(capacity);
        self
    }

    /// Validates a write of `size` bytes at `offset` and makes room for it.
    pub(crate) fn prepare_write(&mut self, offset: usize, size: usize) -> Result<()> {
        let capacity = self.capacity();
        if !self.no_assert && offset > capacity {
            return Err(BufferError::out_of_range(offset, size, capacity));
        }
        let end = offset
            .checked_add(size)
            .ok_or_else(|| BufferError::out_of_range(offset, size, capacity))?;
        self.ensure_capacity(end);
        Ok(())
    }

    /// End of the bytes variable-length decoders may consume. Running into it
    /// mid-value is reported as truncation.
    pub(crate) fn readable_end(&self) -> usize {
        let capacity = self.capacity();
        if self.no_assert {
            capacity
        } else {
            self.limit.min(capacity)
        }
    }

    /// A variable-length read must start inside the storage. Starting exactly
    /// at the end is allowed and reads as truncation.
    pub(crate) fn check_read_start(&self, offset: usize) -> Result<()> {
        let capacity = self.capacity();
        if !self.no_assert && offset > capacity {
            return Err(BufferError::out_of_range(offset, 1, capacity));
        }
        Ok(())
    }

    /// Runs `f` over `[0, readable_end)`.
    pub(crate) fn with_readable<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let end = self.readable_end();
        self.storage.with_bytes(|bytes| f(&bytes[..end]))
    }

    pub(crate) fn check_range(&self, begin: usize, end: usize) -> Result<()> {
        let capacity = self.capacity();
        if !self.no_assert && (begin > end || end > capacity) {
            return Err(BufferError::IllegalRange {
                begin,
                end,
                capacity,
            });
        }
        Ok(())
    }

    /// Applies the relative half of the addressing protocol: run the absolute
    /// `op` at the cursor, then advance by the byte count it reports.
    pub(crate) fn advance_with(
        &mut self,
        op: impl FnOnce(&mut Self, usize) -> Result<usize>,
    ) -> Result<&mut Self> {
        let offset = self.offset;
        let written = op(self, offset)?;
        self.offset = offset + written;
        Ok(self)
    }

    /// Relative read counterpart of [`advance_with`](Self::advance_with).
    pub(crate) fn consume_with<T>(
        &mut self,
        op: impl FnOnce(&Self, usize) -> Result<Decoded<T>>,
    ) -> Result<T> {
        let decoded = op(&*self, self.offset)?;
        self.offset += decoded.length;
        Ok(decoded.value)
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (begin, end) = if self.offset <= self.limit {
            (self.offset, self.limit)
        } else {
            (self.limit, self.offset)
        };
        let end = end.min(self.capacity());
        let begin = begin.min(end);
        let content = self.storage.to_vec(begin, end).unwrap_or_default();
        f.debug_struct("ByteBuffer")
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity())
            .field("endianness", &self.endianness)
            .field("content", &BStr::new(&content))
            .finish()
    }
}
