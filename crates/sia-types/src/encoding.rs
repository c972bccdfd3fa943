//! Canonical binary encoding.
//!
//! Every consensus object is serialized with the same self-framed format:
//!
//! - integers are fixed-width little-endian
//! - booleans are a single `0x00`/`0x01` byte
//! - variable-length collections carry a u64 length prefix
//! - strings are length-prefixed UTF-8 without a terminator
//! - timestamps are i64 nanoseconds since the Unix epoch
//!
//! Objects are encoded field-by-field in declaration order; there are no
//! schema tags. The encoding is consensus-critical: hashing, signing, and
//! network transmission all go through this module, and any deviation from
//! the canonical byte stream forks the chain.

use std::io::{self, Read, Write};
use thiserror::Error;

/// Errors produced while decoding a canonical byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended, or the decoder's byte budget was exhausted, before
    /// the object was fully read.
    #[error("encoded object exceeds allotted length")]
    Truncated,

    /// A length prefix was larger than the bytes remaining in the stream.
    #[error("length prefix {prefix} exceeds remaining bytes {remaining}")]
    InvalidPrefix { prefix: u64, remaining: u64 },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A string field did not contain valid UTF-8.
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    /// An enum tag byte did not name a known variant.
    #[error("invalid enum tag {0}")]
    InvalidTag(u8),

    /// The underlying reader failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// An encoder writes canonically-encoded values to an underlying sink.
///
/// Writes are buffered and infallible at the call site; the first sink error
/// latches and subsequent writes are dropped. The latched error surfaces on
/// [`Encoder::flush`], which must be called to drain the buffer.
pub struct Encoder<W: Write> {
    w: W,
    buf: [u8; 1024],
    n: usize,
    err: Option<io::Error>,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder that writes to `w`.
    pub fn new(w: W) -> Self {
        Encoder {
            w,
            buf: [0; 1024],
            n: 0,
            err: None,
        }
    }

    /// Returns a reference to the underlying sink.
    ///
    /// Buffered bytes are not visible to the sink until [`Encoder::flush`].
    pub fn get_ref(&self) -> &W {
        &self.w
    }

    fn flush_buf(&mut self) {
        if self.err.is_none() && self.n > 0 {
            if let Err(e) = self.w.write_all(&self.buf[..self.n]) {
                self.err = Some(e);
            }
        }
        self.n = 0;
    }

    /// Drains the internal buffer, surfacing the first sink error if any
    /// write failed.
    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_buf();
        match self.err.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Writes raw bytes with no framing.
    pub fn write(&mut self, mut p: &[u8]) {
        while !p.is_empty() {
            if self.err.is_some() {
                return;
            }
            if self.n == self.buf.len() {
                self.flush_buf();
                continue;
            }
            let k = (self.buf.len() - self.n).min(p.len());
            self.buf[self.n..self.n + k].copy_from_slice(&p[..k]);
            self.n += k;
            p = &p[k..];
        }
    }

    /// Writes a boolean as a single byte.
    pub fn write_bool(&mut self, b: bool) {
        self.write(&[b as u8]);
    }

    /// Writes a u8.
    pub fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    /// Writes a u64 as 8 little-endian bytes.
    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    /// Writes a length prefix for a variable-length collection.
    pub fn write_prefix(&mut self, n: usize) {
        self.write_u64(n as u64);
    }

    /// Writes a length-prefixed byte slice.
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.write_prefix(b.len());
        self.write(b);
    }

    /// Writes a length-prefixed UTF-8 string without a terminator.
    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Writes a timestamp as i64 nanoseconds since the Unix epoch.
    pub fn write_time(&mut self, t: i64) {
        self.write(&t.to_le_bytes());
    }
}

/// A decoder reads canonically-encoded values from a length-bounded source.
///
/// The decoder carries a sticky error: once a read fails, every subsequent
/// read is a no-op returning a zero value, and the error surfaces once via
/// [`Decoder::finish`]. Reads past the byte budget fail with
/// [`DecodeError::Truncated`].
pub struct Decoder<R: Read> {
    r: R,
    remaining: u64,
    err: Option<DecodeError>,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder that reads at most `max_len` bytes from `r`.
    pub fn new(r: R, max_len: u64) -> Self {
        Decoder {
            r,
            remaining: max_len,
            err: None,
        }
    }

    /// Records `err` if no error has been recorded yet. Public so that
    /// composite decoders can trip the sticky error on malformed values the
    /// primitive readers cannot detect (e.g. an unknown enum tag).
    pub fn fail(&mut self, err: DecodeError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Reports whether the decoder has tripped its sticky error.
    pub fn is_err(&self) -> bool {
        self.err.is_some()
    }

    /// Returns the bytes remaining in the decoder's budget.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Surfaces the sticky error, if any.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Reads raw bytes, zero-filling `buf` on failure.
    pub fn read(&mut self, buf: &mut [u8]) {
        if self.err.is_some() {
            buf.fill(0);
            return;
        }
        if buf.len() as u64 > self.remaining {
            self.fail(DecodeError::Truncated);
            buf.fill(0);
            return;
        }
        match self.r.read_exact(buf) {
            Ok(()) => self.remaining -= buf.len() as u64,
            Err(e) => {
                let err = if e.kind() == io::ErrorKind::UnexpectedEof {
                    DecodeError::Truncated
                } else {
                    DecodeError::Io(e)
                };
                self.fail(err);
                buf.fill(0);
            }
        }
    }

    /// Reads a boolean; any byte other than 0 or 1 is a decode error.
    pub fn read_bool(&mut self) -> bool {
        match self.read_u8() {
            0 => false,
            1 => true,
            b => {
                self.fail(DecodeError::InvalidBool(b));
                false
            }
        }
    }

    /// Reads a u8.
    pub fn read_u8(&mut self) -> u8 {
        let mut buf = [0; 1];
        self.read(&mut buf);
        buf[0]
    }

    /// Reads a little-endian u64.
    pub fn read_u64(&mut self) -> u64 {
        let mut buf = [0; 8];
        self.read(&mut buf);
        u64::from_le_bytes(buf)
    }

    /// Reads a length prefix, rejecting prefixes that could not possibly fit
    /// in the remaining byte budget.
    pub fn read_prefix(&mut self) -> usize {
        let n = self.read_u64();
        if n > self.remaining {
            self.fail(DecodeError::InvalidPrefix {
                prefix: n,
                remaining: self.remaining,
            });
            return 0;
        }
        n as usize
    }

    /// Reads a length-prefixed byte slice.
    pub fn read_bytes(&mut self) -> Vec<u8> {
        let n = self.read_prefix();
        let mut buf = vec![0; n];
        self.read(&mut buf);
        if self.is_err() {
            return Vec::new();
        }
        buf
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> String {
        match String::from_utf8(self.read_bytes()) {
            Ok(s) => s,
            Err(_) => {
                self.fail(DecodeError::InvalidUtf8);
                String::new()
            }
        }
    }

    /// Reads a timestamp as i64 nanoseconds since the Unix epoch.
    pub fn read_time(&mut self) -> i64 {
        let mut buf = [0; 8];
        self.read(&mut buf);
        i64::from_le_bytes(buf)
    }
}

/// A type that can write itself to an [`Encoder`].
pub trait Encodable {
    /// Encodes the value into `e`.
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>);
}

/// A type that can read itself from a [`Decoder`].
///
/// Implementations must tolerate a tripped decoder: reads on a failed
/// decoder return zero values, so `decode_from` always yields *some* value,
/// and the caller discards it if [`Decoder::finish`] reports an error.
pub trait Decodable: Sized {
    /// Decodes a value from `d`.
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self;
}

impl Encodable for () {
    fn encode_to<W: Write>(&self, _e: &mut Encoder<W>) {}
}

impl Decodable for () {
    fn decode_from<R: Read>(_d: &mut Decoder<R>) -> Self {}
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_prefix(self.len());
        for v in self {
            v.encode_to(e);
        }
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let n = d.read_prefix();
        let mut v = Vec::with_capacity(n);
        for _ in 0..n {
            if d.is_err() {
                break;
            }
            v.push(T::decode_from(d));
        }
        v
    }
}

/// A sink that counts bytes without storing them.
#[derive(Debug, Default)]
pub struct WriteCounter {
    n: u64,
}

impl WriteCounter {
    /// Returns the number of bytes written so far.
    pub fn count(&self) -> u64 {
        self.n
    }
}

impl Write for WriteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.n += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Returns the canonical encoded length of `v` without materializing the
/// encoding.
pub fn encoded_len<T: Encodable + ?Sized>(v: &T) -> u64 {
    let mut e = Encoder::new(WriteCounter::default());
    v.encode_to(&mut e);
    let _ = e.flush();
    e.get_ref().count()
}

/// Encodes `v` into a fresh byte vector.
pub fn to_bytes<T: Encodable + ?Sized>(v: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut e = Encoder::new(&mut buf);
    v.encode_to(&mut e);
    let _ = e.flush();
    drop(e);
    buf
}

/// Decodes a value from `buf`, requiring the full buffer to decode cleanly.
pub fn from_bytes<T: Decodable>(buf: &[u8]) -> Result<T, DecodeError> {
    let mut d = Decoder::new(buf, buf.len() as u64);
    let v = T::decode_from(&mut d);
    d.finish()?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_roundtrip() {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        e.write_bool(true);
        e.write_u8(0xab);
        e.write_u64(0x0102030405060708);
        e.write_bytes(b"hello");
        e.write_string("world");
        e.write_time(-1);
        e.flush().unwrap();
        drop(e);

        let mut d = Decoder::new(buf.as_slice(), buf.len() as u64);
        assert!(d.read_bool());
        assert_eq!(d.read_u8(), 0xab);
        assert_eq!(d.read_u64(), 0x0102030405060708);
        assert_eq!(d.read_bytes(), b"hello");
        assert_eq!(d.read_string(), "world");
        assert_eq!(d.read_time(), -1);
        d.finish().unwrap();
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        e.write_u64(1);
        e.flush().unwrap();
        drop(e);
        assert_eq!(buf, [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_bool() {
        let mut d = Decoder::new(&[2u8][..], 1);
        assert!(!d.read_bool());
        assert!(matches!(d.finish(), Err(DecodeError::InvalidBool(2))));
    }

    #[test]
    fn test_truncated_read_is_sticky() {
        let mut d = Decoder::new(&[1u8, 2, 3][..], 3);
        let _ = d.read_u64();
        assert!(d.is_err());
        // subsequent reads are no-ops returning zero values
        assert_eq!(d.read_u64(), 0);
        assert_eq!(d.read_string(), "");
        assert!(matches!(d.finish(), Err(DecodeError::Truncated)));
    }

    #[test]
    fn test_oversize_prefix_rejected() {
        // an 8-byte prefix claiming u64::MAX elements
        let buf = u64::MAX.to_le_bytes();
        let mut d = Decoder::new(&buf[..], buf.len() as u64);
        assert_eq!(d.read_prefix(), 0);
        assert!(matches!(
            d.finish(),
            Err(DecodeError::InvalidPrefix { .. })
        ));
    }

    #[test]
    fn test_budget_enforced_before_source() {
        // the source has plenty of bytes, but the budget is 4
        let buf = [0u8; 64];
        let mut d = Decoder::new(&buf[..], 4);
        let _ = d.read_u64();
        assert!(matches!(d.finish(), Err(DecodeError::Truncated)));
    }

    #[test]
    fn test_encoded_len_matches_to_bytes() {
        let v: Vec<()> = Vec::new();
        // an empty collection still carries its 8-byte prefix
        assert_eq!(encoded_len(&v), 8);
        assert_eq!(to_bytes(&v).len(), 8);
    }

    #[test]
    fn test_encoder_buffer_spill() {
        // force multiple internal buffer flushes
        let payload = vec![0x5au8; 5000];
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        e.write_bytes(&payload);
        e.flush().unwrap();
        drop(e);
        assert_eq!(buf.len(), 8 + 5000);
        assert_eq!(&buf[8..], payload.as_slice());
    }
}
