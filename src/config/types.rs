use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Rental-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
    /// Region name to site base URL (e.g. "boston" -> "https://boston.craigslist.org")
    #[serde(rename = "start-urls")]
    pub start_urls: BTreeMap<String, String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Only the first listing of the first index page is crawled
    #[serde(rename = "testing-mode", default)]
    pub testing_mode: bool,

    /// Spacing between outbound requests (seconds)
    #[serde(rename = "request-delay-seconds", default = "default_request_delay")]
    pub request_delay_seconds: f64,

    /// Let the delay adapt to observed response latency
    #[serde(rename = "auto-throttle", default = "default_auto_throttle")]
    pub auto_throttle: bool,

    /// Domains (and their subdomains) the crawler may request
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Search path appended to each start URL to reach the first index page
    #[serde(rename = "search-path", default = "default_search_path")]
    pub search_path: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the append-only properties artifact
    #[serde(rename = "properties-path", default = "default_properties_path")]
    pub properties_path: String,
}

/// Completion notification settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Destination address for the completion notice
    pub email: String,

    /// From address
    pub sender: String,

    /// Mail relay endpoint accepting a JSON payload
    #[serde(rename = "api-url", default = "default_mail_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the relay API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_request_delay() -> f64 {
    0.2
}

fn default_auto_throttle() -> bool {
    true
}

fn default_search_path() -> String {
    "/search/aap?s=100".to_string()
}

fn default_properties_path() -> String {
    "./properties.txt".to_string()
}

fn default_mail_api_url() -> String {
    "https://api.brevo.com/v3/smtp/email".to_string()
}

fn default_api_key_env() -> String {
    "BREVO_API_KEY".to_string()
}
