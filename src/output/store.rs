//! In-memory result store
//!
//! One map from listing ID to record for the whole run. Listing tasks finish
//! in any order and each one inserts a single key, so the only coordination
//! needed is a short lock around that insert. A later record for the same ID
//! replaces the earlier one.

use crate::extract::ListingRecord;
use crate::output::traits::{OutputResult, RecordExporter};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Process-wide collection of extracted listings, keyed by listing ID
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Mutex<BTreeMap<String, ListingRecord>>,
}

impl ResultStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, returning the one it replaced (if any)
    pub fn put(&self, id: impl Into<String>, record: ListingRecord) -> Option<ListingRecord> {
        self.lock().insert(id.into(), record)
    }

    /// Returns a copy of the record stored under `id`
    pub fn get(&self, id: &str) -> Option<ListingRecord> {
        self.lock().get(id).cloned()
    }

    /// Number of distinct listing IDs stored
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Serializes the whole collection as a single JSON object
    pub fn export_all(&self) -> OutputResult<String> {
        Ok(serde_json::to_string(&*self.lock())?)
    }

    /// Hands the whole collection to an exporter
    pub fn export_with(&self, exporter: &dyn RecordExporter) -> OutputResult<usize> {
        exporter.export(&self.lock())
    }

    // A panic in another task must not lose the records collected so far
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, ListingRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
