//! # Errors
//!
//! Error types and helper functions used in the library.
//!
//! These are internal plumbing errors (I/O, malformed protocol, timeouts) distinct from the
//! RESP `Error` frames the command layer returns to clients on ordinary semantic failures
//! (wrong arity, wrong type, ...): those are wire-protocol *values*, not Rust errors. See
//! [`crate::store::StoreError`] for the latter, whose `Display` impls double as the exact
//! RESP error-frame text.

use thiserror::Error;

/// Application errors
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    ServerError(#[from] ServerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors related to working with [`crate::server`]
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("timed out acquiring a connection permit after {0}")]
    ElapsedError(String),

    #[error("could not acquire a connection permit: {0}")]
    AcquireError(#[from] tokio::sync::AcquireError),

    #[error(transparent)]
    ConnectionError(#[from] ConnectionError),
}

/// Errors related to working with [`crate::conn`]
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CmdError(#[from] CmdError),

    #[error("connection closed mid-frame")]
    TruncatedAtEof,
}

/// Errors related to working with [`crate::cmd`]
#[derive(Debug, Error)]
pub enum CmdError {
    #[error(transparent)]
    RESPError(#[from] RESPError),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error("Clock may have gone backwards: {0}")]
    TimeError(#[from] std::time::SystemTimeError),
}

/// Errors related to working with [`crate::store`].
///
/// Unlike the other error types in this module, these are not purely internal plumbing:
/// their [`Display`](std::fmt::Display) text doubles as the exact RESP `Error` frame body
/// the command layer sends back to clients (see `DataStore`'s doc comment). The command
/// layer never lets a `StoreError` propagate as a Rust error past a single command's
/// handling; it is always converted to a reply frame on the same connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    /// The store's clock (`SystemTime::now()`) failed, i.e. the system clock is set
    /// before `UNIX_EPOCH`. Stored as a string rather than wrapping `SystemTimeError`
    /// directly so this type stays `Clone`/`Eq` like its sibling error types.
    #[error("ERR internal error: clock is unavailable ({0})")]
    Clock(String),
}

/// Errors related to working with [`crate::resp`]
///
/// These signal a genuine protocol violation (the connection handler closes the connection
/// on them). A buffer that is merely *incomplete* is not an error at all: the decoder reports
/// that case out-of-band by returning `Ok(None)` from [`crate::resp::extract_frame`], never
/// one of these variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RESPError {
    #[error("unsupported RESP type byte: {0:#04x}")]
    UnsupportedRESPType(u8),

    #[error("RESP: CRLF (\\r\\n) characters not present at end")]
    CRLFNotAtEnd,

    #[error("missing the LF (\\n) character")]
    LFMissing,

    #[error("received negative length")]
    NegativeLength,

    #[error("couldn't parse {0:?} to integer")]
    IntegerParseError(String),

    /// Sentinel used internally by the decoder to mean "not yet a complete frame".
    /// Never surfaces past [`crate::resp::extract_frame`]; see its doc comment.
    #[error("need more data")]
    NeedMore,
}
