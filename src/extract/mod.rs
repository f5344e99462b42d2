//! Attribute extraction for listing detail pages
//!
//! This module turns the markup of one listing into a [`ListingRecord`]:
//! - Per-field accessors over the parsed document ([`ListingPage`])
//! - Ordered substring vocabularies for categorical attributes
//! - A best-effort reader for the embedded image list
//!
//! Extraction never fails as a whole. Each accessor falls back to the field's
//! documented default and logs why.

mod attributes;
mod images;
mod listing;
mod record;

pub use attributes::Attributes;
pub use images::parse_image_list;
pub use listing::{ListingPage, Rooms};
pub use record::{
    Geolocation, GarageType, HouseType, Laundry, ListingRecord, NOT_AVAILABLE, UNKNOWN,
};

use thiserror::Error;

/// Reasons a single field could not be read from a listing page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Malformed markup: {0}")]
    Malformed(String),

    #[error("Invalid selector {0}")]
    Selector(String),
}

/// Extracts a listing record from a detail page body
///
/// # Example
///
/// ```
/// use rental_crawler::extract::extract_listing;
///
/// let html = r#"<p class="postinginfo">post id: 1001</p><span class="price">$500</span>"#;
/// let record = extract_listing(html, "https://example.craigslist.org/listing/1");
/// assert_eq!(record.id, "1001");
/// assert_eq!(record.rent_per_week, "500");
/// assert_eq!(record.bedrooms, "N.A");
/// ```
pub fn extract_listing(html: &str, url: &str) -> ListingRecord {
    ListingPage::parse(html).record(url)
}
