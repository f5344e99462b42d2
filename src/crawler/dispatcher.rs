//! Listing dispatch
//!
//! Turns each index page into one fetch-and-extract task per listing. Tasks
//! run concurrently on the caller's `JoinSet`; their pace is set by the shared
//! throttle inside the accessor. Duplicate listing URLs are not filtered, the
//! store's overwrite-by-ID absorbs them.

use crate::crawler::fetcher::DocumentAccessor;
use crate::crawler::pagination::IndexPage;
use crate::extract::extract_listing;
use crate::output::{CrawlReport, ResultStore};
use crate::url::listing_url;
use crate::CrawlError;
use scraper::{Html, Selector};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Selector for the result-title anchors of an index page
const RESULT_TITLE_SELECTOR: &str = "[class~=result-title][href]";

/// How a single listing task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// Record extracted and stored under this ID
    Stored(String),

    /// Page fetched but no listing ID could be read
    Unkeyed(String),

    /// Fetch failed (network, timeout or status)
    Failed(String),

    /// URL outside the allowed domains, never requested
    Offsite(String),
}

impl ListingOutcome {
    /// Adds this outcome to the run counters
    pub fn tally(&self, report: &mut CrawlReport) {
        match self {
            ListingOutcome::Stored(_) => report.listings_stored += 1,
            ListingOutcome::Unkeyed(_) => {}
            ListingOutcome::Failed(_) => report.fetch_failures += 1,
            ListingOutcome::Offsite(_) => {
                report.offsite_dropped += 1;
                return;
            }
        }
        report.listings_requested += 1;
    }
}

/// Returns the hrefs of every result-title element, in document order
pub fn listing_hrefs(index_html: &str) -> Vec<String> {
    let document = Html::parse_document(index_html);
    let Ok(selector) = Selector::parse(RESULT_TITLE_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Issues listing tasks for index pages of one region
#[derive(Clone)]
pub struct ListingDispatcher {
    accessor: DocumentAccessor,
    store: Arc<ResultStore>,
    base_url: String,
    first_only: bool,
}

impl ListingDispatcher {
    /// Creates a dispatcher for the region rooted at `base_url`
    pub fn new(accessor: DocumentAccessor, store: Arc<ResultStore>, base_url: impl Into<String>) -> Self {
        Self {
            accessor,
            store,
            base_url: base_url.into(),
            first_only: false,
        }
    }

    /// Dispatches only the first listing of each page (testing mode)
    pub fn first_only(mut self, first_only: bool) -> Self {
        self.first_only = first_only;
        self
    }

    /// Spawns one fetch-and-extract task per listing on `page`
    ///
    /// Returns the number of tasks spawned. Hrefs that cannot be resolved are
    /// logged and skipped.
    pub fn dispatch(&self, page: &IndexPage, tasks: &mut JoinSet<ListingOutcome>) -> usize {
        let mut hrefs = listing_hrefs(&page.body);
        if self.first_only {
            hrefs.truncate(1);
        }

        tracing::debug!("{} listings on {}", hrefs.len(), page.url);

        let mut spawned = 0;
        for href in hrefs {
            let url = match listing_url(&self.base_url, &href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping listing link {:?} on {}: {}", href, page.url, e);
                    continue;
                }
            };

            let accessor = self.accessor.clone();
            let store = Arc::clone(&self.store);
            tasks.spawn(async move { fetch_and_extract(&accessor, &store, url).await });
            spawned += 1;
        }

        spawned
    }
}

/// Fetches one listing, extracts it and stores the record
///
/// Never fails: every problem is logged and reported through the outcome.
pub async fn fetch_and_extract(
    accessor: &DocumentAccessor,
    store: &ResultStore,
    url: String,
) -> ListingOutcome {
    let page = match accessor.fetch(&url).await {
        Ok(page) => page,
        Err(CrawlError::Offsite { url }) => {
            tracing::info!("Dropped offsite listing {}", url);
            return ListingOutcome::Offsite(url);
        }
        Err(e) => {
            tracing::warn!("Failed to fetch listing: {}", e);
            return ListingOutcome::Failed(url);
        }
    };

    let record = extract_listing(&page.body, &page.url);
    if record.id.is_empty() {
        tracing::warn!("No listing ID on {}, record not stored", page.url);
        return ListingOutcome::Unkeyed(page.url);
    }

    let id = record.id.clone();
    if store.put(id.clone(), record).is_some() {
        tracing::debug!("Listing {} seen again, replaced", id);
    }

    ListingOutcome::Stored(id)
}
