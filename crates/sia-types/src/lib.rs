//! # sia-types
//!
//! Core value types for the Sia blockchain and their canonical binary
//! encoding.
//!
//! This crate provides:
//! - The self-framed binary codec used for hashing, signing, and the wire
//!   (little-endian integers, u64 length prefixes, no schema tags)
//! - A reusable BLAKE2b-256 hasher that accepts typed writes
//! - 32-byte identifiers, the 128-bit currency type, and 16-byte specifiers
//! - The v1 and v2 transaction universes and the accumulator element types
//!
//! Everything here is consensus-critical: two implementations that disagree
//! on a single byte of these encodings will fork the chain.

mod currency;
mod encoding;
mod hash;
mod specifier;
pub mod transactions;
pub mod v2;

pub use currency::Currency;
pub use encoding::{
    encoded_len, from_bytes, to_bytes, Decodable, DecodeError, Decoder, Encodable, Encoder,
    WriteCounter,
};
pub use hash::{
    hash_bytes, Address, BlockID, DigestSink, FileContractID, Hash256, Hasher, ParseHashError,
    PublicKey, SiacoinOutputID, SiafundOutputID, Signature,
};
pub use specifier::Specifier;

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A height paired with the ID of the block at that height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainIndex {
    pub height: u64,
    pub id: BlockID,
}

impl Encodable for ChainIndex {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.height);
        self.id.encode_to(e);
    }
}

impl Decodable for ChainIndex {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        ChainIndex {
            height: d.read_u64(),
            id: BlockID::decode_from(d),
        }
    }
}

impl std::fmt::Display for ChainIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.height, self.id)
    }
}

/// Serde adapter for 64-byte storage-proof leaves, rendered as hex.
pub(crate) mod serde_leaf {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(leaf: &[u8; 64], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(leaf))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 64], D::Error> {
        let s = String::deserialize(d)?;
        let mut leaf = [0; 64];
        hex::decode_to_slice(&s, &mut leaf).map_err(serde::de::Error::custom)?;
        Ok(leaf)
    }
}
