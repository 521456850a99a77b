//! # Constants
//!
//! Constants used throughout the application.

/// Local host IPv4 address, without a port.
pub const LOCAL_HOST: &str = "127.0.0.1";

/// Bind address used by tests that need a real listening socket: port 0 asks the OS
/// for an ephemeral free port so parallel test runs don't collide.
#[cfg(test)]
pub const LOCAL_SOCKET_ADDR_STR_TEST: &str = "127.0.0.1:0";

/// Default Redis-compatible listening port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default cap on concurrently-handled connections.
///
/// A soft backstop, not a practical ceiling for normal workloads.
pub const DEFAULT_MAX_CONN: usize = 10_000;

/// How long to wait for a connection-admission permit before rejecting the accept.
pub const CONNECTION_PERMIT_TIMEOUT_MS: u64 = 5_000;

/// Size of each `read()` chunk off the socket. The per-connection buffer itself grows
/// without bound as needed; this is just the read granularity.
pub const BUFFER_LEN: usize = 4096;

/// How often the eviction thread wakes up to run a sweep.
pub const HZ_MS: u64 = 100;

/// Number of keys sampled per round of the probabilistic expiration sweep.
pub const SAMPLE_SIZE: usize = 20;

/// Stop sweeping once at most this fraction of a sampled round was expired.
pub const EXPIRED_RATIO_THRESHOLD: f64 = 0.25;

/// Application exit codes
#[derive(Debug)]
pub enum ExitCode {
    Ok = 0,
    Shutdown = -1,
}
