//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Dropping requests outside the allowed domains
//! - Pacing requests through the shared throttle
//! - Error classification (transport, timeout, non-2xx)
//!
//! There is no retry. A failed request is reported to the caller, which logs
//! it and moves on.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::throttle::Throttle;
use crate::url::is_allowed;
use crate::CrawlError;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use rental_crawler::config::UserAgentConfig;
/// use rental_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RentalCrawler".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Fetches pages on behalf of every crawl stage
///
/// Cloning is cheap; clones share the client, throttle and domain list.
#[derive(Debug, Clone)]
pub struct DocumentAccessor {
    client: Client,
    throttle: Arc<Throttle>,
    allowed_domains: Arc<Vec<String>>,
}

impl DocumentAccessor {
    pub fn new(client: Client, throttle: Arc<Throttle>, allowed_domains: Vec<String>) -> Self {
        Self {
            client,
            throttle,
            allowed_domains: Arc::new(allowed_domains),
        }
    }

    /// Builds an accessor from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, CrawlError> {
        let client = build_http_client(user_agent)?;
        Ok(Self::new(
            client,
            Arc::new(Throttle::from_config(crawler)),
            crawler.allowed_domains.clone(),
        ))
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a page body
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Host not in allowed domains | `CrawlError::Offsite` |
    /// | Timeout | `CrawlError::Timeout` |
    /// | Non-2xx status | `CrawlError::Status` |
    /// | Other transport failure | `CrawlError::Http` |
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        if !is_allowed(url, &self.allowed_domains)? {
            return Err(CrawlError::Offsite {
                url: url.to_string(),
            });
        }

        self.throttle.wait().await;
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            self.throttle.record_latency(started.elapsed()).await;
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;
        self.throttle.record_latency(started.elapsed()).await;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchedPage {
            url: final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

fn classify(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
