use thiserror::Error;

/// A list specifying categories of [`BoltError`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BoltError {
    /// Connecting, reading, or writing on the transport failed.
    #[error("transport error")]
    Transport {
        /// The causing I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The version handshake did not conclude with a mutually supported version.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// A marker byte did not match any entry of the `PackStream` marker table.
    #[error("unknown PackStream marker 0x{marker:02X}")]
    UnknownMarker {
        /// The offending marker byte.
        marker: u8,
    },

    /// The stream ended, or a read returned fewer bytes than required, before a value, chunk,
    /// or message was fully assembled.
    #[error("truncated {what} (expected {expected} bytes)")]
    Truncated {
        /// What was being read when the stream ran out.
        what: &'static str,
        /// How many bytes were expected.
        expected: usize,
    },

    /// String bytes on the wire were not valid UTF-8.
    #[error("invalid UTF-8 in string value")]
    BadUtf8 {
        /// The causing error.
        #[from]
        source: std::string::FromUtf8Error,
    },

    /// The encoder was asked to pack a value outside the supported domain (float, byte array,
    /// boolean, or similar).
    #[error("unsupported value type: {0}")]
    UnsupportedValue(&'static str),

    /// A map had a non-string key.
    #[error("map keys must be strings")]
    UnsupportedKey,

    /// An integer fell outside the representable range `[-2^63, 2^63)`.
    #[error("integer {0} is out of range")]
    IntegerOutOfRange(i128),

    /// A list, map, or string had more than `u32::MAX` elements/bytes.
    #[error("container of size {0} is too large to encode")]
    ContainerTooLarge(usize),

    /// A message's declared field count did not match the number of fields actually present,
    /// or a structure header declared more than 15 fields.
    #[error("malformed message: {0}")]
    Malformed(&'static str),

    /// A message carried a tag this core does not understand in its current state.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server responded to a request with `FAILURE`.
    #[error("server failure {code}: {message}")]
    ServerFailure {
        /// The server-supplied error code, e.g. `Neo.ClientError.Security.Unauthorized`.
        code: String,
        /// The server-supplied human-readable message.
        message: String,
    },

    /// The session has already entered the `Broken` state; the operation was rejected before
    /// touching the wire.
    #[error("session is broken and can no longer be used")]
    SessionBroken,

    /// A shared response's lock was poisoned because some other thread holding it panicked.
    #[error("a shared response lock was poisoned")]
    Poison,
}

impl<G> From<std::sync::PoisonError<G>> for BoltError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}

/// Abbreviation of `Result<T, BoltError>`.
pub type BoltResult<T> = std::result::Result<T, BoltError>;
