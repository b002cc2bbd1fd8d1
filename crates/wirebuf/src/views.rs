//! Operations that re-frame, share or duplicate a buffer's bytes.
//!
//! [`slice`](ByteBuffer::slice), [`read_bytes`](ByteBuffer::read_bytes) and
//! `Clone` alias the storage. [`copy`](ByteBuffer::copy) and
//! [`compact`](ByteBuffer::compact) detach from it.

use alloc::vec::Vec;

use crate::{
    ByteBuffer, Storage,
    error::{BufferError, Result},
};

impl ByteBuffer {
    /// Content window: `[offset, limit)`, or `[0, offset)` when the buffer has
    /// been written but not flipped (`offset > limit`).
    fn window(&self) -> (usize, usize) {
        if self.offset <= self.limit {
            (self.offset, self.limit)
        } else {
            (0, self.offset)
        }
    }

    /// A view on `[begin, end)` of the same storage. Writes through either
    /// buffer are visible through the other.
    pub fn slice(&self, begin: usize, end: usize) -> Result<ByteBuffer> {
        self.check_range(begin, end)?;
        let mut view = self.clone();
        view.offset = begin;
        view.limit = end;
        Ok(view)
    }

    /// An independent buffer with duplicated storage and the same offset and
    /// limit.
    pub fn copy(&self) -> ByteBuffer {
        ByteBuffer {
            storage: self.storage.deep_copy(),
            marked_offset: None,
            ..self.clone()
        }
    }

    /// Copies the content window out into a vector.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let (begin, end) = self.window();
        self.storage.to_vec(begin, end)
    }

    /// Compacts to the content window, flipping first if `offset > limit`.
    pub fn compact(&mut self) -> Result<&mut Self> {
        if self.offset > self.limit {
            self.flip();
        }
        self.compact_range(self.offset, self.limit)
    }

    /// Replaces the storage with a fresh block holding exactly `[begin, end)`;
    /// afterwards `offset = 0` and `limit = end - begin`. A buffer that already
    /// spans its whole storage is left alone.
    pub fn compact_range(&mut self, begin: usize, end: usize) -> Result<&mut Self> {
        if begin == 0 && end == self.capacity() {
            return Ok(self);
        }
        if begin > end {
            return Err(BufferError::IllegalRange {
                begin,
                end,
                capacity: self.capacity(),
            });
        }
        self.check_range(begin, end)?;
        let len = end - begin;
        let fresh = if len == 0 {
            Storage::empty()
        } else {
            let fresh = Storage::new(len);
            self.storage.copy_range(&fresh, 0, begin, end)?;
            fresh
        };
        log::trace!("compacted [{begin}, {end}) of {} bytes", self.capacity());
        self.storage = fresh;
        self.marked_offset = self.marked_offset.and_then(|m| m.checked_sub(begin));
        self.offset = 0;
        self.limit = len;
        Ok(self)
    }

    /// Reverses every byte of the storage and mirrors the cursor so that the
    /// same content stays inside `[offset, limit)`.
    pub fn reverse(&mut self) -> &mut Self {
        let capacity = self.capacity();
        self.storage.reverse();
        let (offset, limit) = (self.offset, self.limit);
        self.offset = capacity.saturating_sub(limit);
        self.limit = capacity.saturating_sub(offset);
        log::trace!("reversed {capacity} bytes");
        self
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.write_bytes_at(bytes, at))
    }

    pub fn write_bytes_at(&mut self, bytes: &[u8], offset: usize) -> Result<usize> {
        self.prepare_write(offset, bytes.len())?;
        self.storage.write_from(offset, bytes)?;
        Ok(bytes.len())
    }

    /// Returns a view on the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<ByteBuffer> {
        let view = self.read_bytes_at(len, self.offset)?;
        self.offset += len;
        Ok(view)
    }

    /// A view on `[offset, offset + len)`. Asking for more than is readable
    /// is truncation.
    pub fn read_bytes_at(&self, len: usize, offset: usize) -> Result<ByteBuffer> {
        self.check_read_start(offset)?;
        let readable = self.readable_end();
        match offset.checked_add(len) {
            Some(end) if end <= readable => self.slice(offset, end),
            _ => Err(BufferError::Truncated {
                offset: readable.max(offset),
            }),
        }
    }

    /// Copies `src`'s content window to the cursor and advances past it.
    /// `src` is never modified.
    pub fn append(&mut self, src: &ByteBuffer) -> Result<&mut Self> {
        self.advance_with(|buf, at| buf.append_at(src, at))
    }

    pub fn append_at(&mut self, src: &ByteBuffer, offset: usize) -> Result<usize> {
        let (begin, end) = src.window();
        let len = end - begin;
        if len == 0 {
            return Ok(0);
        }
        self.prepare_write(offset, len)?;
        src.storage.copy_range(&self.storage, offset, begin, end)
    }

    /// Copies `src`'s content window to just before the cursor and moves the
    /// cursor back onto it.
    ///
    /// When fewer than `len` bytes precede the cursor, the storage is
    /// reallocated larger and everything from the cursor on is shifted right
    /// to make room; bytes before the cursor are not kept in that case.
    pub fn prepend(&mut self, src: &ByteBuffer) -> Result<&mut Self> {
        let offset = self.offset;
        let len = self.prepend_at(src, offset)?;
        self.offset -= len;
        Ok(self)
    }

    /// Absolute form of [`prepend`](Self::prepend): the content window lands
    /// at `offset - len`. Growth still shifts `offset`, `limit` and the mark of
    /// this buffer.
    pub fn prepend_at(&mut self, src: &ByteBuffer, offset: usize) -> Result<usize> {
        let (begin, end) = src.window();
        let len = end - begin;
        if len == 0 {
            return Ok(0);
        }
        let capacity = self.capacity();
        if offset > capacity {
            return Err(BufferError::out_of_range(offset, len, capacity));
        }
        let mut at = offset;
        if len > offset {
            let diff = len - offset;
            let shift = |pos: usize| {
                pos.checked_add(diff)
                    .ok_or_else(|| BufferError::out_of_range(pos, diff, capacity))
            };
            let grown = shift(capacity)?;
            let new_offset = shift(self.offset)?;
            let new_limit = shift(self.limit)?;
            let new_mark = self.marked_offset.map(shift).transpose()?;

            let fresh = Storage::new(grown);
            self.storage.copy_range(&fresh, len, offset, capacity)?;
            self.storage = fresh;
            self.offset = new_offset;
            self.limit = new_limit;
            self.marked_offset = new_mark;
            at += diff;
            log::trace!("prepend grew storage: {capacity} -> {grown}");
        }
        src.storage.copy_range(&self.storage, at - len, begin, end)
    }
}
