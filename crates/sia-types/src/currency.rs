//! The siacoin currency type.

use crate::encoding::{Decodable, Decoder, Encodable, Encoder};
use std::fmt;
use std::io::{Read, Write};
use std::num::ParseIntError;
use std::str::FromStr;

/// One siacoin is 10^24 base units ("hastings").
const HASTINGS_PER_SIACOIN: u128 = 10u128.pow(24);

/// A 128-bit unsigned quantity of hastings.
///
/// Arithmetic that can underflow is exposed through checked operations so
/// callers can clamp (e.g. the block reward floors at the network's minimum
/// coinbase). The canonical encoding is 16 big-endian bytes, matching the
/// legacy chain's byte order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Currency(u128);

impl Currency {
    /// The zero value.
    pub const ZERO: Currency = Currency(0);

    /// The largest representable value.
    pub const MAX: Currency = Currency(u128::MAX);

    /// Constructs a currency from 64-bit low and high halves.
    pub const fn new(lo: u64, hi: u64) -> Self {
        Currency(((hi as u128) << 64) | lo as u128)
    }

    /// Constructs a currency from a raw 128-bit value.
    pub const fn from_raw(v: u128) -> Self {
        Currency(v)
    }

    /// Returns `n` siacoins in hastings.
    pub const fn siacoins(n: u32) -> Self {
        Currency(n as u128 * HASTINGS_PER_SIACOIN)
    }

    /// Returns the raw 128-bit value.
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Returns the low 64 bits.
    pub const fn lo(self) -> u64 {
        self.0 as u64
    }

    /// Returns the high 64 bits.
    pub const fn hi(self) -> u64 {
        (self.0 >> 64) as u64
    }

    /// Reports whether the value is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtracts, returning `None` on underflow.
    pub fn checked_sub(self, rhs: Currency) -> Option<Currency> {
        self.0.checked_sub(rhs.0).map(Currency)
    }

    /// Adds, returning `None` on overflow.
    pub fn checked_add(self, rhs: Currency) -> Option<Currency> {
        self.0.checked_add(rhs.0).map(Currency)
    }

    /// Adds, clamping at the maximum value.
    pub fn saturating_add(self, rhs: Currency) -> Currency {
        Currency(self.0.saturating_add(rhs.0))
    }

    /// Multiplies by a u64 factor, clamping at the maximum value.
    pub fn saturating_mul_u64(self, rhs: u64) -> Currency {
        Currency(self.0.saturating_mul(rhs as u128))
    }

    /// Divides by a u64 divisor, rounding down.
    pub fn div_u64(self, rhs: u64) -> Currency {
        Currency(self.0 / rhs as u128)
    }

    /// Returns the remainder of division by a u64 divisor.
    pub fn rem_u64(self, rhs: u64) -> u64 {
        (self.0 % rhs as u128) as u64
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.0)
    }
}

impl FromStr for Currency {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(Currency)
    }
}

impl Encodable for Currency {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write(&self.0.to_be_bytes());
    }
}

impl Decodable for Currency {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let mut buf = [0; 16];
        d.read(&mut buf);
        Currency(u128::from_be_bytes(buf))
    }
}

impl serde::Serialize for Currency {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Currency {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{from_bytes, to_bytes};

    #[test]
    fn test_halves() {
        let c = Currency::new(2, 1);
        assert_eq!(c.lo(), 2);
        assert_eq!(c.hi(), 1);
        assert_eq!(c.raw(), (1u128 << 64) | 2);
    }

    #[test]
    fn test_siacoins() {
        assert_eq!(Currency::siacoins(1).raw(), 10u128.pow(24));
        assert_eq!(
            Currency::siacoins(30_000).raw(),
            30_000 * 10u128.pow(24)
        );
    }

    #[test]
    fn test_checked_sub_underflow() {
        assert_eq!(
            Currency::siacoins(2).checked_sub(Currency::siacoins(1)),
            Some(Currency::siacoins(1))
        );
        assert_eq!(
            Currency::siacoins(1).checked_sub(Currency::siacoins(2)),
            None
        );
    }

    #[test]
    fn test_big_endian_encoding() {
        let buf = to_bytes(&Currency::from_raw(1));
        assert_eq!(buf.len(), 16);
        assert_eq!(buf[15], 1);
        assert!(buf[..15].iter().all(|&b| b == 0));

        let c: Currency = from_bytes(&buf).unwrap();
        assert_eq!(c, Currency::from_raw(1));
    }

    #[test]
    fn test_serde_decimal_string() {
        let c = Currency::siacoins(3);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{}\"", c.raw()));
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
