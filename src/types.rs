//! # Types
//!
//! Types used throughout the application
//!
//! Redis is originally a simple in-memory key-value data store.
//!
//! A stored entry is either a binary string (which `INCR`/`DECR` additionally interpret
//! as a signed, base-10 integer on read/write) or a list of binary strings, together with
//! an optional expiration deadline.
//!
//!   - From [EXPIRE](https://redis.io/docs/latest/commands/expire/):
//!     "Normally, Redis keys are created without an associated time to live."

use std::collections::VecDeque;

/// Primary key. Keys are arbitrary binary data, not necessarily valid UTF-8.
pub type StorageKey = Vec<u8>;

/// Raw (inner) type of an entry's expiration deadline: nanoseconds since `UNIX_EPOCH`.
pub type ExpirationTimeType = u128;

/// Expiration deadline of an entry, absent when the key never expires.
pub type ExpirationTime = Option<ExpirationTimeType>;

/// The value held by a single entry.
///
/// Integers are not a distinct variant: `INCR`/`DECR` parse [`DataValue::ByteString`] as a
/// signed 64-bit decimal on read and re-serialize it on write, keeping `SET`/`GET` symmetric
/// with `INCR`/`DECR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    ByteString(Vec<u8>),
    List(VecDeque<Vec<u8>>),
}

/// A single row (entry) of the storage: its value and optional expiration deadline.
#[derive(Debug, Clone)]
pub struct DataEntry {
    pub value: DataValue,
    pub expiry_ns: ExpirationTime,
}

impl DataEntry {
    pub fn new(value: DataValue) -> Self {
        Self {
            value,
            expiry_ns: None,
        }
    }

    pub fn with_expiry(value: DataValue, expiry_ns: ExpirationTimeType) -> Self {
        Self {
            value,
            expiry_ns: Some(expiry_ns),
        }
    }

    /// True once `now_ns` has passed this entry's deadline, if it has one.
    pub fn is_expired(&self, now_ns: ExpirationTimeType) -> bool {
        matches!(self.expiry_ns, Some(deadline) if now_ns >= deadline)
    }
}

/// Nanoseconds since `UNIX_EPOCH`, used as the store's monotonic-enough clock.
///
/// `SystemTime` isn't truly monotonic (it can jump on NTP correction), but it matches the
/// Python original this store is modeled on and is adequate for millisecond/second-granularity
/// TTLs; see `DESIGN.md` for the tradeoff. Fails only if the system clock is set before the
/// epoch, mirroring the teacher's `CmdError::TimeError`.
pub fn now_ns() -> Result<ExpirationTimeType, std::time::SystemTimeError> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_nanos())
}
