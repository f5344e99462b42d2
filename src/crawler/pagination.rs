//! Index page pagination
//!
//! Search results are split across index pages linked by a "next" button
//! (`<a class="button next" href="...">`). The walker fetches the start page,
//! follows that button until a page no longer has one, and hands each fetched
//! page to the caller as it goes. The start page is always the first page
//! produced.
//!
//! The walk is strictly sequential: every next URL is only known once the
//! previous page has been fetched. If the site changes its pagination markup
//! the walk simply ends after the first page.

use crate::crawler::fetcher::DocumentAccessor;
use crate::url::next_page_url;
use crate::CrawlError;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Class tokens of the "next page" control, in order
const NEXT_BUTTON_CLASSES: [&str; 2] = ["button", "next"];

/// A fetched index page
#[derive(Debug, Clone)]
pub struct IndexPage {
    /// The URL that was requested
    pub url: String,

    /// Page body content
    pub body: String,
}

/// Returns the href of the first anchor whose class list is exactly
/// `button next`
pub fn find_next_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a[href]").ok()?;

    document
        .select(&anchor)
        .find(|a| {
            a.value()
                .attr("class")
                .map(|classes| classes.split_whitespace().eq(NEXT_BUTTON_CLASSES))
                .unwrap_or(false)
        })
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Lazily walks the index pages reachable from a start page
///
/// Each call to [`next_page`](Self::next_page) performs one fetch. The walker
/// cannot be restarted; build a new one to walk again.
pub struct PaginationWalker {
    accessor: DocumentAccessor,
    start_page: String,
    search_path: String,
    next: Option<String>,
    visited: HashSet<String>,
    single_page: bool,
}

impl PaginationWalker {
    /// Creates a walker positioned at `start_page`
    ///
    /// # Arguments
    ///
    /// * `accessor` - Fetcher used for every index page
    /// * `start_page` - First index page URL (site base URL + search path)
    /// * `search_path` - Search-query suffix replaced by each next href
    pub fn new(
        accessor: DocumentAccessor,
        start_page: impl Into<String>,
        search_path: impl Into<String>,
    ) -> Self {
        let start_page = start_page.into();
        Self {
            accessor,
            next: Some(start_page.clone()),
            start_page,
            search_path: search_path.into(),
            visited: HashSet::new(),
            single_page: false,
        }
    }

    /// Stops after the start page (testing mode)
    pub fn single_page(mut self, single_page: bool) -> Self {
        self.single_page = single_page;
        self
    }

    /// Fetches the next index page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(IndexPage))` - The next page in the walk
    /// * `Ok(None)` - The walk is over
    /// * `Err(CrawlError)` - The page could not be fetched; the walk is over
    pub async fn next_page(&mut self) -> Result<Option<IndexPage>, CrawlError> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };
        self.visited.insert(url.clone());

        let fetched = self.accessor.fetch(&url).await?;
        self.next = self.follow(&fetched.body);

        Ok(Some(IndexPage {
            url,
            body: fetched.body,
        }))
    }

    fn follow(&self, body: &str) -> Option<String> {
        if self.single_page {
            return None;
        }

        let href = find_next_href(body)?;
        let next = match next_page_url(&self.start_page, &self.search_path, &href) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("Ignoring next-page link {:?}: {}", href, e);
                return None;
            }
        };

        if self.visited.contains(&next) {
            tracing::warn!("Pagination cycle at {}, stopping", next);
            return None;
        }

        tracing::debug!("Next index page: {}", next);
        Some(next)
    }
}

/// Collects every index page URL reachable from `start_page`, start page first
///
/// Fetch failures end the walk early; pages fetched up to that point are kept.
pub async fn discover_pages(
    accessor: DocumentAccessor,
    start_page: &str,
    search_path: &str,
) -> Vec<String> {
    let mut walker = PaginationWalker::new(accessor, start_page, search_path);
    let mut pages = Vec::new();

    loop {
        match walker.next_page().await {
            Ok(Some(page)) => pages.push(page.url),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Pagination stopped: {}", e);
                break;
            }
        }
    }

    pages
}
