//! A cursor-based, growable byte buffer for building and parsing binary wire
//! formats.
//!
//! [`ByteBuffer`] pairs a shareable storage block with an `offset`/`limit`
//! cursor and offers fixed-width integers and floats in either byte order,
//! base-128 varints with optional zigzag, a strict UTF-8 codec and four string
//! framings (raw, NUL-terminated, 32-bit and varint length-prefixed).
//!
//! ```rust
//! use wirebuf::ByteBuffer;
//!
//! let mut buf = ByteBuffer::new();
//! buf.write_vstring("hello")?.write_zigzag_varint32(-3)?;
//! buf.flip();
//! assert_eq!(buf.read_vstring()?, "hello");
//! assert_eq!(buf.read_zigzag_varint32()?, -3);
//! # Ok::<(), wirebuf::BufferError>(())
//! ```
//!
//! Decoders distinguish input that ends too early ([`ErrorKind::Truncated`])
//! from input that can never decode ([`ErrorKind::Malformed`]), so a reader
//! fed in chunks can rewind and retry once more bytes arrive.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod encoding;
mod error;
mod fixed;
mod options;
mod storage;
mod strings;
pub mod utf8;
pub mod varint;
mod views;

#[cfg(test)]
mod tests;

pub use buffer::{ByteBuffer, Decoded};
pub use encoding::{Encoding, EncodingRegistry};
pub use error::{BufferError, ErrorKind, Malformation, Result};
pub use options::{BufferOptions, DEFAULT_CAPACITY, Endianness, Metrics};
pub use storage::Storage;
pub use varint::{MAX_VARINT32_BYTES, MAX_VARINT64_BYTES};
