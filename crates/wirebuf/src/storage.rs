//! Backing store shared between buffer views.
//!
//! A [`Storage`] is a handle to one contiguous, zero-initialised block of
//! bytes. Cloning the handle aliases the block: writes through one handle are
//! visible through every other. Growth never mutates a block that someone
//! else still aliases; instead the growing handle is re-pointed at a fresh,
//! larger copy and the other handles keep observing the old block.
//!
//! The type is single-threaded (`Rc` + `RefCell`). No borrow of the inner
//! vector ever escapes a method, so the `RefCell` cannot be observed in a
//! borrowed state by callers.

use alloc::{rc::Rc, vec, vec::Vec};
use core::{cell::RefCell, fmt};

use crate::error::{BufferError, Result};

#[derive(Clone, Default)]
pub struct Storage {
    block: Rc<RefCell<Vec<u8>>>,
}

impl Storage {
    /// Allocates `capacity` zeroed bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from(vec![0u8; capacity])
    }

    /// A zero-length block. Behaves as a valid empty store until something
    /// needs capacity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capacity of the block in bytes.
    pub fn len(&self) -> usize {
        self.block.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if both handles point at the same block.
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        Rc::ptr_eq(&self.block, &other.block)
    }

    /// True if no other handle aliases this block.
    pub fn is_exclusive(&self) -> bool {
        Rc::strong_count(&self.block) == 1 && Rc::weak_count(&self.block) == 0
    }

    pub fn get_u8(&self, index: usize) -> Result<u8> {
        let block = self.block.borrow();
        block
            .get(index)
            .copied()
            .ok_or_else(|| BufferError::out_of_range(index, 1, block.len()))
    }

    pub fn set_u8(&self, index: usize, value: u8) -> Result<()> {
        let mut block = self.block.borrow_mut();
        let capacity = block.len();
        let slot = block
            .get_mut(index)
            .ok_or_else(|| BufferError::out_of_range(index, 1, capacity))?;
        *slot = value;
        Ok(())
    }

    /// Fills `dst` with the bytes at `[offset, offset + dst.len())`.
    pub fn read_into(&self, offset: usize, dst: &mut [u8]) -> Result<()> {
        let block = self.block.borrow();
        let range = checked_range(offset, dst.len(), block.len())?;
        dst.copy_from_slice(&block[range]);
        Ok(())
    }

    /// Overwrites `[offset, offset + src.len())` with `src`.
    pub fn write_from(&self, offset: usize, src: &[u8]) -> Result<()> {
        let mut block = self.block.borrow_mut();
        let range = checked_range(offset, src.len(), block.len())?;
        block[range].copy_from_slice(src);
        Ok(())
    }

    /// Copies `[begin, end)` of this block into `target` starting at
    /// `target_start`, returning the number of bytes copied. `target` may be
    /// this very block; overlapping ranges are handled like `memmove`.
    pub fn copy_range(
        &self,
        target: &Storage,
        target_start: usize,
        begin: usize,
        end: usize,
    ) -> Result<usize> {
        if begin > end {
            return Err(BufferError::IllegalRange {
                begin,
                end,
                capacity: self.len(),
            });
        }
        let len = end - begin;
        if self.ptr_eq(target) {
            let mut block = self.block.borrow_mut();
            let capacity = block.len();
            checked_range(begin, len, capacity)?;
            checked_range(target_start, len, capacity)?;
            block.copy_within(begin..end, target_start);
        } else {
            let src = self.block.borrow();
            let src_range = checked_range(begin, len, src.len())?;
            let mut dst = target.block.borrow_mut();
            let dst_range = checked_range(target_start, len, dst.len())?;
            dst[dst_range].copy_from_slice(&src[src_range]);
        }
        Ok(len)
    }

    /// Grows the block to at least `min_capacity` bytes, preserving content by
    /// position. A no-op when the block is already large enough.
    ///
    /// An exclusively owned block grows in place. A shared block is left
    /// untouched for its other aliases and this handle moves to a fresh copy.
    pub fn resize(&mut self, min_capacity: usize) {
        let capacity = self.len();
        if min_capacity <= capacity {
            return;
        }
        if let Some(cell) = Rc::get_mut(&mut self.block) {
            cell.get_mut().resize(min_capacity, 0);
            log::trace!("storage grown in place: {capacity} -> {min_capacity}");
        } else {
            let mut fresh = Vec::with_capacity(min_capacity);
            fresh.extend_from_slice(self.block.borrow().as_slice());
            fresh.resize(min_capacity, 0);
            self.block = Rc::new(RefCell::new(fresh));
            log::trace!("storage detached from aliases: {capacity} -> {min_capacity}");
        }
    }

    /// Copies `[begin, end)` out into a new vector.
    pub fn to_vec(&self, begin: usize, end: usize) -> Result<Vec<u8>> {
        let block = self.block.borrow();
        if begin > end {
            return Err(BufferError::IllegalRange {
                begin,
                end,
                capacity: block.len(),
            });
        }
        let range = checked_range(begin, end - begin, block.len())?;
        Ok(block[range].to_vec())
    }

    /// Copies the whole block into a new, unaliased storage.
    pub fn deep_copy(&self) -> Storage {
        Storage::from(self.block.borrow().clone())
    }

    /// Runs `f` over a read-only view of the whole block.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let block = self.block.borrow();
        f(block.as_slice())
    }

    /// Reverses the byte order of the whole block in place.
    pub fn reverse(&self) {
        self.block.borrow_mut().reverse();
    }
}

impl From<Vec<u8>> for Storage {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            block: Rc::new(RefCell::new(bytes)),
        }
    }
}

impl From<&[u8]> for Storage {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.len())
            .field("aliases", &Rc::strong_count(&self.block))
            .finish()
    }
}

fn checked_range(offset: usize, len: usize, capacity: usize) -> Result<core::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(offset..end),
        _ => Err(BufferError::out_of_range(offset, len, capacity)),
    }
}
