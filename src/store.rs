//! Flat-file booking store.
//!
//! All bookings live in one JSON object keyed by order id. Every write loads
//! the whole file, changes one key and rewrites the whole file.
//!
//! # Concurrency
//!
//! Read-modify-write cycles are serialized by a process-wide
//! `parking_lot::Mutex`, so two requests in this process cannot drop each
//! other's update. Nothing guards against a second process writing the same
//! file.
//!
//! The API is blocking; async callers run it on the blocking pool (see
//! [`crate::service`]).
//!
//! # Failure handling
//!
//! A missing, unreadable or malformed file reads as an empty store. Write
//! failures are logged and not reported to the caller. Both surface as
//! [`Error::Store`] in the logs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::types::BookingRecord;

/// All bookings, keyed by order id
pub type Bookings = FxHashMap<String, BookingRecord>;

/// Booking store backed by a single JSON file
///
/// Cloning is cheap and clones share the same write lock.
#[derive(Debug, Clone)]
pub struct BookingStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl BookingStore {
    /// Open a store at `path`; the file is created on first write
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every booking, falling back to an empty store on any error
    pub fn load(&self) -> Bookings {
        match self.try_load() {
            Ok(bookings) => bookings,
            Err(e) => {
                warn!(error = %e, "booking file unreadable, using empty store");
                Bookings::default()
            }
        }
    }

    fn try_load(&self) -> Result<Bookings, Error> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Bookings::default()),
            Err(e) => return Err(self.error("read", e)),
        };
        if contents.trim().is_empty() {
            return Ok(Bookings::default());
        }
        serde_json::from_str(&contents).map_err(|e| self.error("parse", e))
    }

    fn try_save(&self, bookings: &Bookings) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error("create directory for", e))?;
        }
        let json = serde_json::to_string_pretty(bookings).map_err(|e| self.error("encode", e))?;
        fs::write(&self.path, json).map_err(|e| self.error("write", e))
    }

    fn error(&self, action: &str, cause: impl std::fmt::Display) -> Error {
        Error::Store(format!("failed to {} {}: {}", action, self.path.display(), cause))
    }

    fn save(&self, bookings: &Bookings) {
        if let Err(e) = self.try_save(bookings) {
            error!(error = %e, "booking not persisted");
        }
    }

    /// Look up one booking
    pub fn get(&self, order_id: &str) -> Option<BookingRecord> {
        self.load().remove(order_id)
    }

    /// Number of stored bookings
    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// Whether the store holds no bookings
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new booking, replacing any record with the same order id
    pub fn insert(&self, record: BookingRecord) {
        let _guard = self.lock.lock();
        let mut bookings = self.load();
        debug!(order_id = %record.order_id, "persisting booking");
        bookings.insert(record.order_id.clone(), record);
        self.save(&bookings);
    }

    /// Apply `f` to an existing booking and persist the result
    ///
    /// Returns the updated record, or `None` if the order id is unknown (the
    /// file is left untouched in that case).
    pub fn update<F>(&self, order_id: &str, f: F) -> Option<BookingRecord>
    where
        F: FnOnce(&mut BookingRecord),
    {
        let _guard = self.lock.lock();
        let mut bookings = self.load();
        let record = bookings.get_mut(order_id)?;
        f(record);
        let updated = record.clone();
        self.save(&bookings);
        Some(updated)
    }

    #[cfg(test)]
    pub(crate) fn lock_for_test(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.lock.lock()
    }
}
