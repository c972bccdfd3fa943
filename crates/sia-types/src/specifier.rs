//! Fixed-size identification tags.

use crate::encoding::{Decodable, Decoder, Encodable, Encoder};
use std::fmt;
use std::io::{Read, Write};

/// A generic 16-byte identification tag, used for RPC IDs, error kinds, and
/// signature algorithm names.
///
/// Specifiers are constructed from strings of at most 16 bytes; the unused
/// tail is zero padding and is stripped for display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specifier([u8; 16]);

impl Specifier {
    /// Constructs a specifier from a string.
    ///
    /// # Panics
    ///
    /// Panics if `s` is longer than 16 bytes; specifiers are compile-time
    /// protocol constants, so an oversized one is a programmer error.
    pub fn new(s: &str) -> Self {
        assert!(s.len() <= 16, "specifier too long: {s:?}");
        let mut buf = [0; 16];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        Specifier(buf)
    }

    /// Constructs a specifier from raw bytes.
    pub const fn from_bytes(b: [u8; 16]) -> Self {
        Specifier(b)
    }

    /// Returns the raw 16 bytes, including zero padding.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        f.write_str(&String::from_utf8_lossy(&self.0[..end]))
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Specifier({self})")
    }
}

impl Encodable for Specifier {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write(&self.0);
    }
}

impl Decodable for Specifier {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let mut buf = [0; 16];
        d.read(&mut buf);
        Specifier(buf)
    }
}

impl serde::Serialize for Specifier {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Specifier {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        if s.len() > 16 {
            return Err(serde::de::Error::custom("specifier too long"));
        }
        Ok(Specifier::new(&s))
    }
}
