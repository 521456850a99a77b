//! # Data Store
//!
//! The shared, thread-safe key/value map at the core of the server: a single [`Mutex`]
//! guarding a `HashMap` from binary key to [`DataEntry`].
//!
//! A coarse mutex is the correct choice here and matches the source this store is modeled
//! on: every public operation below takes the lock for exactly the duration of its own
//! critical section and never holds it across network I/O or another operation. See
//! `DESIGN.md` for the sharded-locking refinement this leaves on the table.
//!
//! Values are one of two kinds ([`DataValue::ByteString`], [`DataValue::List`]); there is no
//! distinct integer kind. `INCR`/`DECR` parse the byte string as a signed 64-bit decimal on
//! read and re-serialize it on write, which keeps `SET`/`GET` symmetric with `INCR`/`DECR`.

use crate::constants::{EXPIRED_RATIO_THRESHOLD, SAMPLE_SIZE};
use crate::errors::StoreError;
use crate::types::{now_ns, DataEntry, DataValue, ExpirationTimeType, StorageKey};
use rand::seq::SliceRandom;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type Result<T> = std::result::Result<T, StoreError>;

/// Removes `key` from `entries` if its deadline has passed. A no-op for keys that are
/// absent or have no deadline.
fn prune_if_expired(entries: &mut HashMap<StorageKey, DataEntry>, key: &[u8], now: ExpirationTimeType) {
    if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
        entries.remove(key);
    }
}

/// The shared key/value store. See the module docs for the locking discipline.
#[derive(Debug, Default)]
pub struct DataStore {
    entries: Mutex<HashMap<StorageKey, DataEntry>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<StorageKey, DataEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clock(&self) -> Result<ExpirationTimeType> {
        now_ns().map_err(|e| StoreError::Clock(e.to_string()))
    }

    /// `GET`. A live entry that isn't expired returns its value; an expired entry is
    /// deleted eagerly and reported as a miss, same as an absent key.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let now = self.clock()?;
        let mut entries = self.lock();
        prune_if_expired(&mut entries, key, now);
        match entries.get(key) {
            None => Ok(None),
            Some(DataEntry { value: DataValue::ByteString(bytes), .. }) => Ok(Some(bytes.clone())),
            Some(DataEntry { value: DataValue::List(_), .. }) => Err(StoreError::WrongType),
        }
    }

    /// `SET key value`. Replaces any prior entry, clearing its expiry.
    pub fn set(&self, key: StorageKey, value: Vec<u8>) {
        self.lock().insert(key, DataEntry::new(DataValue::ByteString(value)));
    }

    /// `SET key value EX|PX n`. Replaces any prior entry with a deadline `ttl_ns` from now.
    pub fn set_with_expiry(&self, key: StorageKey, value: Vec<u8>, ttl_ns: u128) -> Result<()> {
        let now = self.clock()?;
        self.lock()
            .insert(key, DataEntry::with_expiry(DataValue::ByteString(value), now + ttl_ns));
        Ok(())
    }

    /// `DEL` (single key). Returns whether an entry was actually removed.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.lock().remove(key).is_some()
    }

    /// `EXISTS` (single key).
    pub fn exists(&self, key: &[u8]) -> Result<bool> {
        let now = self.clock()?;
        let mut entries = self.lock();
        prune_if_expired(&mut entries, key, now);
        Ok(entries.contains_key(key))
    }

    /// `INCR`.
    pub fn incr(&self, key: &[u8]) -> Result<i64> {
        self.bump(key, 1)
    }

    /// `DECR`.
    pub fn decr(&self, key: &[u8]) -> Result<i64> {
        self.bump(key, -1)
    }

    fn bump(&self, key: &[u8], delta: i64) -> Result<i64> {
        let now = self.clock()?;
        let mut entries = self.lock();
        prune_if_expired(&mut entries, key, now);
        let current: i64 = match entries.get(key) {
            None => 0,
            Some(DataEntry { value: DataValue::ByteString(bytes), .. }) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(StoreError::NotAnInteger)?,
            Some(DataEntry { value: DataValue::List(_), .. }) => return Err(StoreError::NotAnInteger),
        };
        let next = current.checked_add(delta).ok_or(StoreError::NotAnInteger)?;
        entries.insert(key.to_vec(), DataEntry::new(DataValue::ByteString(next.to_string().into_bytes())));
        Ok(next)
    }

    /// `LPUSH key value`. Creates the list if missing; prepends; returns the new length.
    pub fn lpush(&self, key: &[u8], value: Vec<u8>) -> Result<usize> {
        self.push(key, value, true)
    }

    /// `RPUSH key value`. Creates the list if missing; appends; returns the new length.
    pub fn rpush(&self, key: &[u8], value: Vec<u8>) -> Result<usize> {
        self.push(key, value, false)
    }

    fn push(&self, key: &[u8], value: Vec<u8>, front: bool) -> Result<usize> {
        let now = self.clock()?;
        let mut entries = self.lock();
        prune_if_expired(&mut entries, key, now);
        let entry = entries
            .entry(key.to_vec())
            .or_insert_with(|| DataEntry::new(DataValue::List(VecDeque::new())));
        match &mut entry.value {
            DataValue::List(list) => {
                if front {
                    list.push_front(value);
                } else {
                    list.push_back(value);
                }
                Ok(list.len())
            }
            DataValue::ByteString(_) => Err(StoreError::WrongType),
        }
    }

    /// `LRANGE key start stop`. `start`/`stop` are raw (already-parsed) indices; negative
    /// indices count from the end. Both bounds are inclusive once normalized, matching Redis
    /// rather than the source this store is modeled on (see `DESIGN.md`).
    pub fn lrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        let now = self.clock()?;
        let mut entries = self.lock();
        prune_if_expired(&mut entries, key, now);
        let list = match entries.get(key) {
            None => return Ok(Vec::new()),
            Some(DataEntry { value: DataValue::List(list), .. }) => list,
            Some(DataEntry { value: DataValue::ByteString(_), .. }) => return Err(StoreError::WrongType),
        };

        let n = list.len() as i64;
        if n == 0 {
            return Ok(Vec::new());
        }
        let norm_start = if start < 0 { (start + n).max(0) } else { start };
        let norm_stop = if stop < 0 { stop + n } else { stop.min(n - 1) };
        if norm_start > norm_stop || norm_start >= n || norm_stop < 0 {
            return Ok(Vec::new());
        }

        let start_idx = norm_start as usize;
        let stop_idx = norm_stop as usize;
        Ok(list.iter().skip(start_idx).take(stop_idx - start_idx + 1).cloned().collect())
    }

    /// The probabilistic expiration sweep: repeatedly sample [`SAMPLE_SIZE`] keys, delete
    /// the expired ones among them, and stop once a round expires fewer than
    /// [`EXPIRED_RATIO_THRESHOLD`] of its sample (or the keyset is too small to sample).
    ///
    /// Each key's check-and-maybe-delete is its own critical section; the lock is never
    /// held across the whole sweep, only per key, bounding worst-case hold time.
    pub fn remove_expired_keys(&self) -> Result<()> {
        loop {
            let now = self.clock()?;

            let snapshot: Vec<StorageKey> = self.lock().keys().cloned().collect();
            if snapshot.len() < SAMPLE_SIZE {
                return Ok(());
            }

            let mut rng = rand::thread_rng();
            let sample: Vec<&StorageKey> = snapshot.choose_multiple(&mut rng, SAMPLE_SIZE).collect();

            let mut expired = 0usize;
            for key in &sample {
                let mut entries = self.lock();
                if entries.get(key.as_slice()).is_some_and(|entry| entry.is_expired(now)) {
                    entries.remove(key.as_slice());
                    expired += 1;
                }
            }

            if (expired as f64) < SAMPLE_SIZE as f64 * EXPIRED_RATIO_THRESHOLD {
                return Ok(());
            }
        }
    }
}
