//! Named text encodings for buffer contents.
//!
//! An [`EncodingRegistry`] maps names to [`Encoding`] function pairs. The
//! default registry knows `utf8`, `binary` (one char per byte, latin-1),
//! `hex` (lowercase out, either case in) and `base64` (standard alphabet,
//! padded). Callers register their own formats next to them.
//!
//! ```rust
//! use wirebuf::{BufferOptions, ByteBuffer, EncodingRegistry};
//!
//! let registry = EncodingRegistry::default();
//! let buf = ByteBuffer::from_encoded(&registry, "hex", "cafe", BufferOptions::default())?;
//! assert_eq!(buf.to_encoded(&registry, "base64")?, "yv4=");
//! # Ok::<(), wirebuf::BufferError>(())
//! ```

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};

use base64::{DecodeError, Engine, engine::general_purpose::STANDARD};

use crate::{
    BufferOptions, ByteBuffer,
    error::{BufferError, Malformation, Result},
    utf8,
};

/// Converts between raw bytes and their textual form.
#[derive(Debug, Clone, Copy)]
pub struct Encoding {
    pub to_string: fn(&[u8]) -> Result<String>,
    pub from_string: fn(&str) -> Result<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct EncodingRegistry {
    encodings: BTreeMap<String, Encoding>,
}

impl Default for EncodingRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("utf8", UTF8);
        registry.register("binary", BINARY);
        registry.register("hex", HEX);
        registry.register("base64", BASE64);
        registry
    }
}

impl EncodingRegistry {
    /// A registry without any encodings.
    pub fn empty() -> Self {
        Self {
            encodings: BTreeMap::new(),
        }
    }

    /// Adds or replaces `name`, returning the encoding it replaced.
    pub fn register(&mut self, name: &str, encoding: Encoding) -> Option<Encoding> {
        log::debug!("registering encoding {name:?}");
        self.encodings.insert(name.to_string(), encoding)
    }

    pub fn get(&self, name: &str) -> Option<&Encoding> {
        self.encodings.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.encodings.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Result<&Encoding> {
        self.get(name)
            .ok_or_else(|| BufferError::InvalidArgument(format!("unknown encoding {name:?}")))
    }

    pub fn encode(&self, name: &str, bytes: &[u8]) -> Result<String> {
        (self.lookup(name)?.to_string)(bytes)
    }

    pub fn decode(&self, name: &str, text: &str) -> Result<Vec<u8>> {
        (self.lookup(name)?.from_string)(text)
    }
}

impl ByteBuffer {
    /// Renders the content window with the encoding registered as `name`.
    pub fn to_encoded(&self, registry: &EncodingRegistry, name: &str) -> Result<String> {
        registry.encode(name, &self.to_vec()?)
    }

    /// Wraps the bytes `text` decodes to under the encoding `name`.
    pub fn from_encoded(
        registry: &EncodingRegistry,
        name: &str,
        text: &str,
        options: BufferOptions,
    ) -> Result<ByteBuffer> {
        Ok(ByteBuffer::wrap(registry.decode(name, text)?, options))
    }
}

const UTF8: Encoding = Encoding {
    to_string: utf8_to_string,
    from_string: |text| Ok(text.as_bytes().to_vec()),
};

const BINARY: Encoding = Encoding {
    to_string: |bytes| Ok(bytes.iter().copied().map(char::from).collect()),
    from_string: binary_from_string,
};

const HEX: Encoding = Encoding {
    to_string: hex_to_string,
    from_string: hex_from_string,
};

const BASE64: Encoding = Encoding {
    to_string: base64_to_string,
    from_string: base64_from_string,
};

fn utf8_to_string(bytes: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let decoded = utf8::decode_code_point(bytes, pos)?;
        let c = char::from_u32(decoded.value).ok_or(BufferError::malformed(
            pos,
            Malformation::CodePointOutOfRange(decoded.value),
        ))?;
        out.push(c);
        pos += decoded.length;
    }
    Ok(out)
}

fn invalid_symbol(encoding: &'static str, text: &str, pos: usize) -> BufferError {
    let symbol = text
        .get(pos..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    BufferError::malformed(pos, Malformation::InvalidSymbol { encoding, symbol })
}

fn binary_from_string(text: &str) -> Result<Vec<u8>> {
    text.char_indices()
        .map(|(pos, c)| u8::try_from(c).map_err(|_| invalid_symbol("binary", text, pos)))
        .collect()
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[allow(clippy::unnecessary_wraps)]
fn hex_to_string(bytes: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX_DIGITS[usize::from(b >> 4)]));
        out.push(char::from(HEX_DIGITS[usize::from(b & 0x0F)]));
    }
    Ok(out)
}

fn hex_from_string(text: &str) -> Result<Vec<u8>> {
    let digits = text.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(BufferError::malformed(
            digits.len(),
            Malformation::InvalidLength { encoding: "hex" },
        ));
    }
    let nibble = |pos: usize| -> Result<u8> {
        let value = match digits[pos] {
            c @ b'0'..=b'9' => c - b'0',
            c @ b'a'..=b'f' => c - b'a' + 10,
            c @ b'A'..=b'F' => c - b'A' + 10,
            _ => return Err(invalid_symbol("hex", text, pos)),
        };
        Ok(value)
    };
    (0..digits.len())
        .step_by(2)
        .map(|pos| Ok((nibble(pos)? << 4) | nibble(pos + 1)?))
        .collect()
}

#[allow(clippy::unnecessary_wraps)]
fn base64_to_string(bytes: &[u8]) -> Result<String> {
    Ok(STANDARD.encode(bytes))
}

fn base64_from_string(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text).map_err(|err| match err {
        DecodeError::InvalidByte(pos, _) | DecodeError::InvalidLastSymbol(pos, _) => {
            invalid_symbol("base64", text, pos)
        }
        DecodeError::InvalidLength(len) => BufferError::malformed(
            len,
            Malformation::InvalidLength { encoding: "base64" },
        ),
        _ => BufferError::malformed(
            text.len(),
            Malformation::InvalidLength { encoding: "base64" },
        ),
    })
}
