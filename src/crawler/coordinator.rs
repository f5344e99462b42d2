//! Crawler coordinator - main crawl orchestration logic
//!
//! A run walks every configured region concurrently. Inside a region the
//! index pages are walked in order and each page's listings are fanned out as
//! soon as the page arrives. When every region has drained its listing tasks
//! the collected records are exported once and the completion notice is sent.
//!
//! Nothing below the run level aborts the crawl: failed fetches, unreadable
//! listings and export or notification failures are logged and the run
//! carries on with whatever it has.

use crate::config::Config;
use crate::crawler::dispatcher::{ListingDispatcher, ListingOutcome};
use crate::crawler::fetcher::DocumentAccessor;
use crate::crawler::pagination::PaginationWalker;
use crate::output::{
    log_report, CompletionNotifier, CrawlReport, JsonAppendExporter, ResultStore,
};
use crate::url::index_url;
use crate::CrawlError;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    accessor: DocumentAccessor,
    store: Arc<ResultStore>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let accessor = DocumentAccessor::from_config(&config.crawler, &config.user_agent)?;

        Ok(Self {
            config: Arc::new(config),
            accessor,
            store: Arc::new(ResultStore::new()),
        })
    }

    /// The store records are collected into
    pub fn store(&self) -> Arc<ResultStore> {
        Arc::clone(&self.store)
    }

    /// Runs the crawl to completion
    ///
    /// 1. Walks each region's index pages, dispatching listings as pages arrive
    /// 2. Waits for every listing task
    /// 3. Appends the collected records to the properties file
    /// 4. Sends the completion notice, if configured
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let testing_mode = self.config.crawler.testing_mode;
        if testing_mode {
            tracing::info!("Testing mode: first region, first page, first listing only");
        }

        let mut report = CrawlReport::new();
        let mut regions = JoinSet::new();

        for (region, base_url) in self.regions() {
            tracing::info!("Crawling region {} ({})", region, base_url);
            regions.spawn(crawl_region(
                self.accessor.clone(),
                Arc::clone(&self.store),
                base_url,
                self.config.crawler.search_path.clone(),
                testing_mode,
            ));
        }

        while let Some(joined) = regions.join_next().await {
            match joined {
                Ok(region_report) => report.merge(&region_report),
                Err(e) => tracing::error!("Region task failed: {}", e),
            }
        }

        report.finish(self.store.len());
        self.export();
        self.notify().await;
        log_report(&report);

        Ok(report)
    }

    fn regions(&self) -> Vec<(String, String)> {
        let take = if self.config.crawler.testing_mode {
            1
        } else {
            self.config.start_urls.len()
        };

        self.config
            .start_urls
            .iter()
            .take(take)
            .map(|(region, base_url)| (region.clone(), base_url.clone()))
            .collect()
    }

    fn export(&self) {
        let exporter = JsonAppendExporter::new(&self.config.output.properties_path);
        match self.store.export_with(&exporter) {
            Ok(count) => tracing::info!(
                "Wrote {} listings to {}",
                count,
                exporter.path().display()
            ),
            Err(e) => tracing::error!(
                "Failed to write {}: {}",
                exporter.path().display(),
                e
            ),
        }
    }

    async fn notify(&self) {
        let Some(notify) = &self.config.notify else {
            return;
        };

        let notifier = CompletionNotifier::from_env(self.accessor.client().clone(), notify.clone());
        if let Err(e) = notifier.send_completion().await {
            tracing::warn!("Completion notice not sent: {}", e);
        }
    }
}

/// Walks one region's index pages and drains its listing tasks
async fn crawl_region(
    accessor: DocumentAccessor,
    store: Arc<ResultStore>,
    base_url: String,
    search_path: String,
    testing_mode: bool,
) -> CrawlReport {
    let mut report = CrawlReport::new();
    report.regions = 1;

    let start_page = index_url(&base_url, &search_path);
    let dispatcher =
        ListingDispatcher::new(accessor.clone(), store, base_url).first_only(testing_mode);
    let mut walker =
        PaginationWalker::new(accessor, start_page, search_path).single_page(testing_mode);
    let mut tasks: JoinSet<ListingOutcome> = JoinSet::new();

    loop {
        match walker.next_page().await {
            Ok(Some(page)) => {
                report.index_pages += 1;
                let spawned = dispatcher.dispatch(&page, &mut tasks);
                tracing::info!("Index page {}: {} listings", page.url, spawned);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Pagination stopped: {}", e);
                report.fetch_failures += 1;
                break;
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcome.tally(&mut report),
            Err(e) => tracing::error!("Listing task failed: {}", e),
        }
    }

    report
}

/// Runs a crawl with the given configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (individual failures are in the report)
/// * `Err(CrawlError)` - The crawl could not start
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
