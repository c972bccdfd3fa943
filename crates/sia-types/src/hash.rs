//! 32-byte identifiers and the BLAKE2b-256 hasher.

use crate::encoding::{Decodable, Decoder, Encodable, Encoder};
use blake2::{Blake2b, Digest};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Type alias for Blake2b with 256-bit output.
pub(crate) type Blake2b256 = Blake2b<blake2::digest::consts::U32>;

/// An error returned when parsing a 32-byte identifier from hex.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseHashError(hex::FromHexError);

impl fmt::Display for ParseHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hash literal: {}", self.0)
    }
}

impl std::error::Error for ParseHashError {}

macro_rules! hash_types {
    ($($(#[$attr:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Parses an identifier from a 64-character hex string.
            pub fn parse(s: &str) -> Result<Self, ParseHashError> {
                let mut buf = [0; 32];
                hex::decode_to_slice(s, &mut buf).map_err(ParseHashError)?;
                Ok($name(buf))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseHashError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(b: [u8; 32]) -> Self {
                $name(b)
            }
        }

        impl From<$name> for [u8; 32] {
            fn from(h: $name) -> Self {
                h.0
            }
        }

        impl Encodable for $name {
            fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
                e.write(&self.0);
            }
        }

        impl Decodable for $name {
            fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
                let mut buf = [0; 32];
                d.read(&mut buf);
                $name(buf)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    )+};
}

hash_types! {
    /// A generic 256-bit BLAKE2b hash.
    Hash256,
    /// The ID of a block; doubles as the chain's proof-of-work target
    /// representation, interpreted as a 256-bit big-endian integer.
    BlockID,
    /// The recipient of siacoin or siafund outputs.
    Address,
    /// An Ed25519 public key.
    PublicKey,
    /// The ID of a siacoin output.
    SiacoinOutputID,
    /// The ID of a siafund output.
    SiafundOutputID,
    /// The ID of a file contract.
    FileContractID,
}

/// An Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Default for Signature {
    fn default() -> Self {
        Signature([0; 64])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl Encodable for Signature {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write(&self.0);
    }
}

impl Decodable for Signature {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let mut buf = [0; 64];
        d.read(&mut buf);
        Signature(buf)
    }
}

impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        let mut buf = [0; 64];
        hex::decode_to_slice(&s, &mut buf).map_err(serde::de::Error::custom)?;
        Ok(Signature(buf))
    }
}

/// Hashes raw bytes with BLAKE2b-256.
pub fn hash_bytes(b: &[u8]) -> Hash256 {
    Hash256(Blake2b256::digest(b).into())
}

/// The sink a [`Hasher`]'s encoder writes into. Not constructible outside
/// this module; it only appears in the `Hasher::encoder` return type.
pub struct DigestSink(Blake2b256);

impl Write for DigestSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A reusable BLAKE2b-256 sink that accepts canonically-encoded values.
///
/// The hasher embeds an [`Encoder`] writing directly into the hash state, so
/// typed values can be hashed without materializing their encoding. The API
/// is reset-centric: construct once, then `reset`/write/`sum` per hash. A
/// fresh hasher is cheap, so call sites that would pool in other languages
/// can simply stack-allocate one.
pub struct Hasher {
    enc: Encoder<DigestSink>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Creates a hasher with an empty state.
    pub fn new() -> Self {
        Hasher {
            enc: Encoder::new(DigestSink(Blake2b256::new())),
        }
    }

    /// Clears the hash state and any buffered input.
    pub fn reset(&mut self) {
        self.enc = Encoder::new(DigestSink(Blake2b256::new()));
    }

    /// Returns the encoder feeding the hash state.
    pub fn encoder(&mut self) -> &mut Encoder<DigestSink> {
        &mut self.enc
    }

    /// Returns the digest of everything written so far without consuming the
    /// hasher; further writes may follow.
    pub fn sum(&mut self) -> Hash256 {
        // the digest sink cannot fail, so flush only drains the buffer
        let _ = self.enc.flush();
        Hash256(self.enc.get_ref().0.clone().finalize().into())
    }
}
