//! Listing detail page accessors
//!
//! Each accessor is an independent scan over the parsed document. None of
//! them depend on each other, and each reports a missing or unexpected
//! structure as an [`ExtractError`] instead of panicking. [`ListingPage::record`]
//! turns those errors into the field defaults.

use crate::extract::attributes::Attributes;
use crate::extract::images::{parse_image_list, IMAGE_LIST_MARKER};
use crate::extract::record::{Geolocation, ListingRecord, NOT_AVAILABLE};
use crate::extract::ExtractError;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Characters dropped from the "post id: " text of the posting info
const POSTING_ID_PREFIX_LEN: usize = 9;

/// Bedroom and bathroom counts read from the first attribute group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rooms {
    pub beds: String,
    pub baths: String,
    /// Any further room tokens, in document order
    pub extras: Vec<String>,
}

impl Default for Rooms {
    fn default() -> Self {
        Self {
            beds: NOT_AVAILABLE.to_string(),
            baths: NOT_AVAILABLE.to_string(),
            extras: Vec::new(),
        }
    }
}

/// A parsed listing detail page
pub struct ListingPage {
    document: Html,
}

impl ListingPage {
    /// Parses a listing page body
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Builds the full record, substituting defaults for every field that
    /// could not be read
    pub fn record(&self, url: &str) -> ListingRecord {
        let defaults = ListingRecord::default();

        let breadcrumb = or_default("breadcrumb", self.breadcrumb(), Vec::new());
        let rooms = or_default("rooms", self.rooms(), Rooms::default());
        let attributes = or_default("attributes", self.attributes(), Attributes::default());

        ListingRecord {
            id: or_default("id", self.listing_id(), defaults.id),
            url: url.to_string(),
            address: or_default("address", self.address(), defaults.address),
            area: breadcrumb.first().cloned().unwrap_or_default(),
            sub_area: breadcrumb.get(1).cloned().unwrap_or_default(),
            posted_at: or_default("posted_at", self.post_time(), defaults.posted_at),
            rent_per_week: or_default("rent", self.rent(), defaults.rent_per_week),
            bedrooms: rooms.beds,
            bathrooms: rooms.baths,
            square_feet: or_default("square_feet", self.square_feet(), defaults.square_feet),
            laundry: attributes.laundry,
            house_type: attributes.house_type,
            pets_allowed_dogs: attributes.dogs,
            pets_allowed_cats: attributes.cats,
            furnished: attributes.furnished,
            garage_type: attributes.garage,
            smoking_allowed: attributes.smoking,
            wheelchair_accessible: attributes.wheelchair_accessible,
            available_from: attributes.available,
            images: or_default("images", self.images(), defaults.images),
            location: or_default("location", self.location(), defaults.location),
        }
    }

    /// Breadcrumb trail: the text of each list item's `p > a`
    ///
    /// Walks list items in document order and stops at the first item without
    /// a nested paragraph. The first two entries are the area and sub-area
    /// when the breadcrumb has its usual shape.
    pub fn breadcrumb(&self) -> Result<Vec<String>, ExtractError> {
        let li = selector("li")?;
        let p = selector("p")?;
        let a = selector("a")?;

        let mut trail = Vec::new();
        for item in self.document.select(&li) {
            let Some(paragraph) = item.select(&p).next() else {
                break;
            };
            if let Some(link) = paragraph.select(&a).next() {
                trail.push(element_text(link));
            }
        }
        Ok(trail)
    }

    /// The `datetime` attribute of the first `<time>` element, verbatim
    pub fn post_time(&self) -> Result<String, ExtractError> {
        let time = self
            .document
            .select(&selector("time")?)
            .next()
            .ok_or(ExtractError::MissingElement("time"))?;

        time.value()
            .attr("datetime")
            .map(str::to_string)
            .ok_or(ExtractError::MissingAttribute {
                element: "time",
                attribute: "datetime",
            })
    }

    /// Text of the first span whose first class is `price`, minus its
    /// leading currency symbol
    pub fn rent(&self) -> Result<String, ExtractError> {
        let price = self
            .document
            .select(&selector("span")?)
            .find(|span| first_class(*span) == Some("price"))
            .ok_or(ExtractError::MissingElement("span.price"))?;

        Ok(element_text(price).chars().skip(1).collect())
    }

    /// Bedroom/bathroom counts from the first attribute group
    ///
    /// Children of the group are read positionally. A child bubble holding
    /// bolded tokens (`<b>2BR</b> / <b>1Ba</b>`) contributes one token per
    /// bold element; any other child contributes its own text. Separator
    /// tokens are skipped.
    pub fn rooms(&self) -> Result<Rooms, ExtractError> {
        let group = self
            .attribute_groups()?
            .into_iter()
            .next()
            .ok_or(ExtractError::MissingElement("p.attrgroup"))?;

        let bold = selector("b")?;
        let mut tokens = Vec::new();
        for child in group.children().filter_map(ElementRef::wrap) {
            let nested: Vec<String> = child.select(&bold).map(element_text).collect();
            if nested.is_empty() {
                tokens.push(element_text(child));
            } else {
                tokens.extend(nested);
            }
        }
        tokens.retain(|token| !token.is_empty() && token != "/");

        if tokens.is_empty() {
            return Err(ExtractError::Malformed(
                "attribute group has no room tokens".to_string(),
            ));
        }

        let mut tokens = tokens.into_iter();
        let mut rooms = Rooms::default();
        if let Some(beds) = tokens.next() {
            rooms.beds = beds.replace("BR", "").trim().to_string();
        }
        if let Some(baths) = tokens.next() {
            rooms.baths = baths.replace("Ba", "").trim().to_string();
        }
        rooms.extras = tokens.collect();

        Ok(rooms)
    }

    /// Square footage from an unlabeled `<span><b>N</b>ft<sup>2</sup></span>`
    ///
    /// The span must have exactly three child nodes, exactly one of them
    /// bold, with the second being the text `ft`. When several spans
    /// qualify the last one wins.
    pub fn square_feet(&self) -> Result<String, ExtractError> {
        self.document
            .select(&selector("span")?)
            .filter_map(square_feet_of)
            .last()
            .ok_or(ExtractError::MissingElement("square footage span"))
    }

    /// Listing ID from the first `p.postinginfo` that holds plain text
    pub fn listing_id(&self) -> Result<String, ExtractError> {
        self.document
            .select(&selector("p")?)
            .filter(|p| first_class(*p) == Some("postinginfo"))
            .find_map(direct_string)
            .map(|text| {
                text.chars()
                    .skip(POSTING_ID_PREFIX_LEN)
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .ok_or(ExtractError::MissingElement("p.postinginfo"))
    }

    /// Latitude/longitude of the first geotagged container
    pub fn location(&self) -> Result<Geolocation, ExtractError> {
        let map = self
            .document
            .select(&selector("div")?)
            .find(|div| div.value().attr("data-accuracy").is_some())
            .ok_or(ExtractError::MissingElement("div[data-accuracy]"))?;

        let attr = |name: &str| {
            map.value()
                .attr(name)
                .map(str::to_string)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Ok(Geolocation {
            lat: attr("data-latitude"),
            long: attr("data-longitude"),
        })
    }

    /// Street address from the first `div.mapaddress`
    pub fn address(&self) -> Result<String, ExtractError> {
        self.document
            .select(&selector("div")?)
            .find(|div| first_class(*div) == Some("mapaddress"))
            .map(element_text)
            .filter(|text| !text.is_empty())
            .ok_or(ExtractError::MissingElement("div.mapaddress"))
    }

    /// Categorical attributes from the plain-text spans of every attribute group
    pub fn attributes(&self) -> Result<Attributes, ExtractError> {
        let span = selector("span")?;
        let texts: Vec<String> = self
            .attribute_groups()?
            .into_iter()
            .flat_map(|group| group.select(&span).filter_map(direct_string).collect::<Vec<_>>())
            .collect();

        Ok(Attributes::from_spans(texts.iter().map(String::as_str)))
    }

    /// Image URLs from the first script mentioning `imgList`
    pub fn images(&self) -> Result<Vec<String>, ExtractError> {
        let script = self
            .document
            .select(&selector("script")?)
            .map(|script| script.text().collect::<String>())
            .find(|text| text.contains(IMAGE_LIST_MARKER))
            .ok_or(ExtractError::MissingElement("imgList script"))?;

        parse_image_list(&script)
    }

    fn attribute_groups(&self) -> Result<Vec<ElementRef<'_>>, ExtractError> {
        Ok(self
            .document
            .select(&selector("p")?)
            .filter(|p| first_class(*p) == Some("attrgroup"))
            .collect())
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {:?}", css, e)))
}

fn first_class(element: ElementRef<'_>) -> Option<&str> {
    element
        .value()
        .attr("class")
        .and_then(|classes| classes.split_whitespace().next())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of an element whose only content is a single text node, looking
/// through single-child wrappers
fn direct_string(element: ElementRef<'_>) -> Option<String> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    match only.value() {
        Node::Text(text) => Some(text.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(only).and_then(direct_string),
        _ => None,
    }
}

fn square_feet_of(span: ElementRef<'_>) -> Option<String> {
    let children: Vec<_> = span.children().collect();
    if children.len() != 3 {
        return None;
    }

    let bold_count = children
        .iter()
        .filter_map(|child| ElementRef::wrap(*child))
        .filter(|child| child.value().name() == "b")
        .count();
    if bold_count != 1 {
        return None;
    }

    match children[1].value() {
        Node::Text(unit) if unit.trim() == "ft" => {}
        _ => return None,
    }

    let value = match children[0].value() {
        Node::Text(text) => text.trim().to_string(),
        Node::Element(_) => ElementRef::wrap(children[0]).map(element_text)?,
        _ => return None,
    };

    Some(value).filter(|value| !value.is_empty())
}

/// Logs an accessor failure and substitutes the field default
fn or_default<T>(field: &'static str, result: Result<T, ExtractError>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(field, "Falling back to default: {}", e);
            default
        }
    }
}
