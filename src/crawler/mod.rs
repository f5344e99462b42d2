//! Crawler module for the two-stage crawl
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the allowed-domain filter and request throttle
//! - Index page pagination
//! - Per-listing fetch-and-extract dispatch
//! - Overall crawl coordination

mod coordinator;
mod dispatcher;
mod fetcher;
mod pagination;
mod throttle;

pub use coordinator::{run_crawl, Coordinator};
pub use dispatcher::{fetch_and_extract, listing_hrefs, ListingDispatcher, ListingOutcome};
pub use fetcher::{build_http_client, user_agent_string, DocumentAccessor, FetchedPage};
pub use pagination::{discover_pages, find_next_href, IndexPage, PaginationWalker};
pub use throttle::{Throttle, MAX_AUTO_DELAY};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and throttle
/// 2. Walk each region's index pages
/// 3. Fetch and extract every listing
/// 4. Export the collected records
/// 5. Send the completion notice
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(CrawlError)` - Crawl could not start
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    run_crawl(config).await
}
