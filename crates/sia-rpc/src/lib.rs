//! # sia-rpc
//!
//! The length-framed RPC envelope used between Sia peers.
//!
//! The envelope is deliberately thin: a request is a 16-byte [`Specifier`]
//! naming the RPC, optionally followed by a request object; a response is a
//! boolean followed by either an [`Error`] or the response object. All
//! framing comes from the canonical codec's length prefixes, and every read
//! is capped by a caller-supplied byte budget so a malicious peer cannot
//! force unbounded allocation.
//!
//! I/O is synchronous against caller-provided streams; cancellation is
//! delegated to the stream itself (closing it surfaces as a decode or flush
//! error).

use sia_types::{Decodable, DecodeError, Decoder, Encodable, Encoder, Specifier};
use std::fmt;
use std::io::{self, Read, Write};
use tracing::{debug, trace};

/// An error sent in place of a response object.
///
/// The same record is both the on-wire payload and a Rust error value: the
/// `kind` specifier gives a coarse machine-readable class, `data` carries
/// kind-specific structure, and `description` is for humans. Clients must
/// not parse the description for control flow; match on `kind`, or use
/// [`Error::is`] for diagnostics-grade substring checks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Error {
    pub kind: Specifier,
    pub data: Vec<u8>,
    pub description: String,
}

impl Error {
    /// Creates an error of unspecified kind from a description.
    pub fn new(description: impl Into<String>) -> Self {
        Error {
            kind: Specifier::default(),
            data: Vec::new(),
            description: description.into(),
        }
    }

    /// Reports whether this error's description contains the display form
    /// of `target`. Matching is substring-based because the wire carries no
    /// structured cause beyond the kind specifier.
    pub fn is<E: fmt::Display + ?Sized>(&self, target: &E) -> bool {
        self.description.contains(&target.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl std::error::Error for Error {}

impl Encodable for Error {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.kind.encode_to(e);
        e.write_bytes(&self.data);
        e.write_string(&self.description);
    }
}

impl Decodable for Error {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        Error {
            kind: Specifier::decode_from(d),
            data: d.read_bytes(),
            description: d.read_string(),
        }
    }
}

/// A failure while reading an RPC response.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The stream could not be decoded.
    #[error("failed to read message: {0}")]
    Decode(#[from] DecodeError),

    /// The peer answered with an RPC error.
    #[error("response error: {0}")]
    Rpc(#[from] Error),
}

/// Writes `obj` to `w` and flushes.
pub fn write_object<W: Write, T: Encodable + ?Sized>(w: W, obj: &T) -> io::Result<()> {
    let mut e = Encoder::new(w);
    obj.encode_to(&mut e);
    e.flush()
}

/// Reads an object from `r`, reading at most `max_len` bytes. On any decode
/// failure the partial value is discarded.
pub fn read_object<R: Read, T: Decodable>(r: R, max_len: u64) -> Result<T, DecodeError> {
    let mut d = Decoder::new(r, max_len);
    let v = T::decode_from(&mut d);
    d.finish()?;
    Ok(v)
}

/// Sends an RPC request: the request ID, then the request object, if any.
pub fn write_request<W: Write, T: Encodable>(
    mut w: W,
    id: Specifier,
    req: Option<&T>,
) -> io::Result<()> {
    trace!(%id, "writing rpc request");
    write_object(&mut w, &id)?;
    if let Some(req) = req {
        write_object(&mut w, req)?;
    }
    Ok(())
}

/// Reads an RPC request ID.
pub fn read_id<R: Read>(r: R) -> Result<Specifier, DecodeError> {
    read_object(r, 16)
}

/// Reads an RPC request object.
pub fn read_request<R: Read, T: Decodable>(r: R, max_len: u64) -> Result<T, DecodeError> {
    read_object(r, max_len)
}

/// Sends an RPC response: either the response object or an error.
pub fn write_response<W: Write, T: Encodable>(w: W, resp: Result<&T, &Error>) -> io::Result<()> {
    let mut e = Encoder::new(w);
    match resp {
        Ok(obj) => {
            e.write_bool(false);
            obj.encode_to(&mut e);
        }
        Err(err) => {
            e.write_bool(true);
            err.encode_to(&mut e);
        }
    }
    e.flush()
}

/// Reads an RPC response, returning the peer's error directly if it sent
/// one.
pub fn read_response<R: Read, T: Decodable>(r: R, max_len: u64) -> Result<T, ResponseError> {
    let mut d = Decoder::new(r, max_len);
    if d.read_bool() {
        let err = Error::decode_from(&mut d);
        d.finish()?;
        debug!(kind = %err.kind, "rpc error response");
        return Err(ResponseError::Rpc(err));
    }
    let v = T::decode_from(&mut d);
    d.finish()?;
    Ok(v)
}
