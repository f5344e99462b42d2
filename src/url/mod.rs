//! URL handling module for Rental-Crawler
//!
//! Classifieds pages link with site-relative hrefs, so most of this module is
//! about gluing an href back onto the site root it came from. It also carries
//! the allowed-domain check applied before every outbound request.

use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use rental_crawler::url::extract_domain;
///
/// let url = Url::parse("https://Boston.Craigslist.org/search/aap").unwrap();
/// assert_eq!(extract_domain(&url), Some("boston.craigslist.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks if a host falls under an allowed-domain entry
///
/// An entry matches the domain itself and any subdomain of it, so
/// `craigslist.org` admits `boston.craigslist.org`. A leading `*.` on the
/// entry is accepted and means the same thing.
///
/// # Examples
///
/// ```
/// use rental_crawler::url::domain_matches;
///
/// assert!(domain_matches("craigslist.org", "craigslist.org"));
/// assert!(domain_matches("craigslist.org", "boston.craigslist.org"));
/// assert!(domain_matches("*.craigslist.org", "newyork.craigslist.org"));
/// assert!(!domain_matches("craigslist.org", "notcraigslist.org"));
/// ```
pub fn domain_matches(entry: &str, host: &str) -> bool {
    let base = entry.strip_prefix("*.").unwrap_or(entry);
    host == base || host.ends_with(&format!(".{}", base))
}

/// Returns true if the URL may be requested under the allowed-domain list
///
/// An empty list allows every host.
pub fn is_allowed(url: &str, allowed_domains: &[String]) -> UrlResult<bool> {
    if allowed_domains.is_empty() {
        return Ok(true);
    }

    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
    let host = extract_domain(&parsed).ok_or(UrlError::MissingDomain)?;

    Ok(allowed_domains
        .iter()
        .any(|entry| domain_matches(&entry.to_lowercase(), &host)))
}

/// Builds the first index page URL for a region
///
/// `https://boston.craigslist.org` + `/search/aap?s=100`
pub fn index_url(base_url: &str, search_path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), search_path)
}

/// Resolves a listing href found on an index page
///
/// Site-relative hrefs are prefixed with the region's base URL. Hrefs that are
/// already absolute http(s) URLs are used as-is.
pub fn listing_url(base_url: &str, href: &str) -> UrlResult<String> {
    resolve_on_site(base_url, href)
}

/// Computes the next index page URL from the "next" control's href
///
/// The search-query suffix of the start page is replaced by the href. When the
/// start page does not end with the configured search path the site origin is
/// used as the prefix instead.
///
/// # Examples
///
/// ```
/// use rental_crawler::url::next_page_url;
///
/// let next = next_page_url(
///     "https://boston.craigslist.org/search/aap?s=100",
///     "/search/aap?s=100",
///     "/search/aap?s=200",
/// )
/// .unwrap();
/// assert_eq!(next, "https://boston.craigslist.org/search/aap?s=200");
/// ```
pub fn next_page_url(start_page: &str, search_path: &str, href: &str) -> UrlResult<String> {
    let prefix = match start_page.strip_suffix(search_path) {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => {
            let parsed = Url::parse(start_page)
                .map_err(|e| UrlError::Parse(format!("{}: {}", start_page, e)))?;
            parsed.origin().ascii_serialization()
        }
    };

    resolve_on_site(&prefix, href)
}

fn resolve_on_site(site_root: &str, href: &str) -> UrlResult<String> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Malformed("empty href".to_string()));
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Ok(href.to_string());
    }

    // Protocol-relative links inherit the site's scheme
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = Url::parse(site_root)
            .map_err(|e| UrlError::Parse(format!("{}: {}", site_root, e)))?
            .scheme()
            .to_string();
        return Ok(format!("{}://{}", scheme, rest));
    }

    let root = site_root.trim_end_matches('/');
    if href.starts_with('/') {
        Ok(format!("{}{}", root, href))
    } else {
        Ok(format!("{}/{}", root, href))
    }
}
