//! Eviction Facility
//!
//! The background sweeper thread: wakes up every [`HZ_MS`] milliseconds and asks the
//! [`DataStore`] to run its probabilistic expiration sweep. Unlike the teacher's
//! whole-map-scan eviction loop, the sampling itself lives in [`DataStore::remove_expired_keys`];
//! this loop is just the scheduling primitive invoking it.

use crate::constants::HZ_MS;
use crate::errors::CmdError;
use crate::store::DataStore;
use log::{debug, error, trace};
use std::sync::Arc;
use std::time::Duration;

/// Runs the sweeper forever, meant to be spawned on its own OS thread.
///
/// Sweeper errors are ordinarily best-effort and swallowed by [`DataStore::remove_expired_keys`]
/// itself (a sweep round just stops early); the only way this function returns an `Err` is an
/// unrecoverable system clock failure, which also terminates the sweeper thread. The rest of
/// the server keeps running without eviction in that case.
pub fn eviction_loop(store: Arc<DataStore>) -> Result<(), CmdError> {
    debug!("Starting the eviction loop...");
    loop {
        if let Err(err) = store.remove_expired_keys() {
            error!("eviction sweep failed, stopping the eviction loop: {err}");
            return Err(CmdError::from(err));
        }
        trace!("sweep complete");
        std::thread::sleep(Duration::from_millis(HZ_MS));
    }
}
