//! Output module for collected listings
//!
//! This module handles:
//! - Accumulating extracted records for the duration of a run
//! - Appending the final collection to the properties artifact
//! - Sending the completion notice
//! - Reporting run counters

mod export;
mod notify;
mod store;
mod traits;

pub use export::JsonAppendExporter;
pub use notify::CompletionNotifier;
pub use store::ResultStore;
pub use traits::{CrawlReport, OutputError, OutputResult, RecordExporter};

/// Logs the end-of-run report
pub fn log_report(report: &CrawlReport) {
    tracing::info!("Scraped {} property listings", report.unique_listings);
    tracing::info!(
        "Regions: {}, index pages: {}, listings requested: {}, stored: {} ({:.1}%)",
        report.regions,
        report.index_pages,
        report.listings_requested,
        report.listings_stored,
        report.success_rate()
    );

    if report.fetch_failures > 0 || report.offsite_dropped > 0 {
        tracing::warn!(
            "Fetch failures: {}, offsite requests dropped: {}",
            report.fetch_failures,
            report.offsite_dropped
        );
    }

    if let Some(seconds) = report.duration_seconds() {
        tracing::info!("Run took {} seconds", seconds);
    }
}
