//! Fixed-width integers and IEEE-754 floats.
//!
//! Every multi-byte value uses the buffer's [`Endianness`]. Reads check
//! `[offset, offset + width)` against the capacity and fail with
//! [`BufferError::OutOfRange`](crate::BufferError::OutOfRange); writes grow the
//! storage instead.

use crate::{ByteBuffer, Endianness, error::Result};

macro_rules! impl_fixed_width {
    ($($t:ty => $write:ident, $write_at:ident, $read:ident, $read_at:ident;)+) => {
        impl ByteBuffer {
            $(
                pub fn $write(&mut self, value: $t) -> Result<&mut Self> {
                    self.advance_with(|buf, at| buf.$write_at(value, at))
                }

                pub fn $write_at(&mut self, value: $t, offset: usize) -> Result<usize> {
                    let bytes = match self.endianness {
                        Endianness::Big => value.to_be_bytes(),
                        Endianness::Little => value.to_le_bytes(),
                    };
                    self.prepare_write(offset, bytes.len())?;
                    self.storage.write_from(offset, &bytes)?;
                    Ok(bytes.len())
                }

                pub fn $read(&mut self) -> Result<$t> {
                    let value = self.$read_at(self.offset)?;
                    self.offset += size_of::<$t>();
                    Ok(value)
                }

                pub fn $read_at(&self, offset: usize) -> Result<$t> {
                    let mut bytes = [0u8; size_of::<$t>()];
                    self.storage.read_into(offset, &mut bytes)?;
                    Ok(match self.endianness {
                        Endianness::Big => <$t>::from_be_bytes(bytes),
                        Endianness::Little => <$t>::from_le_bytes(bytes),
                    })
                }
            )+
        }
    };
}

impl_fixed_width! {
    i8 => write_i8, write_i8_at, read_i8, read_i8_at;
    u8 => write_u8, write_u8_at, read_u8, read_u8_at;
    i16 => write_i16, write_i16_at, read_i16, read_i16_at;
    u16 => write_u16, write_u16_at, read_u16, read_u16_at;
    i32 => write_i32, write_i32_at, read_i32, read_i32_at;
    u32 => write_u32, write_u32_at, read_u32, read_u32_at;
    i64 => write_i64, write_i64_at, read_i64, read_i64_at;
    u64 => write_u64, write_u64_at, read_u64, read_u64_at;
    f32 => write_f32, write_f32_at, read_f32, read_f32_at;
    f64 => write_f64, write_f64_at, read_f64, read_f64_at;
}
