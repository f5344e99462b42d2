//! Output traits and types
//!
//! This module defines the exporter interface, the output error type and the
//! run report handed to exporters and notifiers at the end of a crawl.

use crate::extract::ListingRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Notification API key not set (expected in ${0})")]
    MissingApiKey(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Counters and timestamps for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Regions whose start URL was walked
    pub regions: u64,

    /// Index pages fetched successfully
    pub index_pages: u64,

    /// Listing detail fetches issued
    pub listings_requested: u64,

    /// Listings extracted and stored
    pub listings_stored: u64,

    /// Fetches abandoned after a network or status error
    pub fetch_failures: u64,

    /// Requests dropped by the allowed-domain filter
    pub offsite_dropped: u64,

    /// Distinct listing IDs in the store when the run finished
    pub unique_listings: u64,
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            regions: 0,
            index_pages: 0,
            listings_requested: 0,
            listings_stored: 0,
            fetch_failures: 0,
            offsite_dropped: 0,
            unique_listings: 0,
        }
    }
}

impl CrawlReport {
    /// Creates a report stamped with the current time
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds another report's counters into this one
    pub fn merge(&mut self, other: &CrawlReport) {
        self.regions += other.regions;
        self.index_pages += other.index_pages;
        self.listings_requested += other.listings_requested;
        self.listings_stored += other.listings_stored;
        self.fetch_failures += other.fetch_failures;
        self.offsite_dropped += other.offsite_dropped;
    }

    /// Marks the run as finished now
    pub fn finish(&mut self, unique_listings: usize) {
        self.unique_listings = unique_listings as u64;
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Percentage of requested listings that made it into the store
    pub fn success_rate(&self) -> f64 {
        if self.listings_requested == 0 {
            return 0.0;
        }
        (self.listings_stored as f64 / self.listings_requested as f64) * 100.0
    }
}

/// Trait for writing the final record collection somewhere durable
///
/// Exporters are called once, after every listing task has completed.
pub trait RecordExporter {
    /// Writes the full collection
    ///
    /// # Arguments
    ///
    /// * `records` - Every stored record keyed by listing ID
    ///
    /// # Returns
    ///
    /// The number of records written
    fn export(&self, records: &BTreeMap<String, ListingRecord>) -> OutputResult<usize>;
}
