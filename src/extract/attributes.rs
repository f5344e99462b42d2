//! Categorical listing attributes
//!
//! The attribute groups on a detail page are a bag of short free-text spans
//! ("apartment", "w/d in unit", "cats are OK - purrr", ...). Each span is
//! tested against an ordered vocabulary per category; the first entry that is
//! a substring of the span wins for that span, and a later span overrides an
//! earlier one.
//!
//! The vocabulary order is significant. `house` precedes `townhouse` and
//! `laundry on site` precedes `no laundry on site`, so those overlapping
//! phrases resolve to the earlier entry.

use crate::extract::record::{GarageType, HouseType, Laundry};

const HOUSE_TYPES: &[(&str, HouseType)] = &[
    ("apartment", HouseType::Apartment),
    ("condo", HouseType::Condo),
    ("cottage/cabin", HouseType::CottageCabin),
    ("duplex", HouseType::Duplex),
    ("flat", HouseType::Flat),
    ("house", HouseType::House),
    ("in-law", HouseType::InLaw),
    ("loft", HouseType::Loft),
    ("townhouse", HouseType::Townhouse),
    ("manufactured", HouseType::Manufactured),
    ("assisted living", HouseType::AssistedLiving),
    ("land", HouseType::Land),
];

const GARAGE_TYPES: &[(&str, GarageType)] = &[
    ("carport", GarageType::Carport),
    ("attached garage", GarageType::AttachedGarage),
    ("detached garage", GarageType::DetachedGarage),
    ("off-street parking", GarageType::OffStreetParking),
    ("street parking", GarageType::StreetParking),
    ("valet parking", GarageType::ValetParking),
];

const LAUNDRY_TYPES: &[(&str, Laundry)] = &[
    ("w/d in unit", Laundry::WasherDryerInUnit),
    ("w/d hookups", Laundry::WasherDryerHookups),
    ("laundry in bldg", Laundry::LaundryInBuilding),
    ("laundry on site", Laundry::LaundryOnSite),
    ("no laundry on site", Laundry::NoLaundryOnSite),
];

const FURNISHED_MARKER: &str = "furnished";
const DOGS_MARKER: &str = "wooof";
const CATS_MARKER: &str = "purrr";
const NO_SMOKING_MARKER: &str = "no smoking";
const WHEELCHAIR_MARKER: &str = "wheelchair accessible";
const AVAILABLE_MARKER: &str = "available";

/// Characters dropped from the front of an "available ..." span
const AVAILABLE_PREFIX_LEN: usize = 9;

/// Attributes gathered from all attribute-group spans of one listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub house_type: HouseType,
    pub garage: GarageType,
    pub laundry: Laundry,
    pub furnished: bool,
    pub dogs: bool,
    pub cats: bool,
    pub smoking: bool,
    pub wheelchair_accessible: bool,
    pub available: String,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            house_type: HouseType::Unknown,
            garage: GarageType::Unknown,
            laundry: Laundry::Unknown,
            furnished: false,
            dogs: false,
            cats: false,
            smoking: true,
            wheelchair_accessible: false,
            available: String::new(),
        }
    }
}

impl Attributes {
    /// Folds every span text into a fresh attribute set
    pub fn from_spans<'a, I>(spans: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut attributes = Self::default();
        for span in spans {
            attributes.apply(span);
        }
        attributes
    }

    /// Applies one span's text to the attribute set
    pub fn apply(&mut self, span: &str) {
        if let Some(house_type) = first_match(HOUSE_TYPES, span) {
            self.house_type = house_type;
        }

        if let Some(garage) = first_match(GARAGE_TYPES, span) {
            self.garage = garage;
        }

        if let Some(laundry) = first_match(LAUNDRY_TYPES, span) {
            self.laundry = laundry;
        }

        if span.contains(FURNISHED_MARKER) {
            self.furnished = true;
        }
        if span.contains(DOGS_MARKER) {
            self.dogs = true;
        }
        if span.contains(CATS_MARKER) {
            self.cats = true;
        }
        if span.contains(NO_SMOKING_MARKER) {
            self.smoking = false;
        }
        if span.contains(WHEELCHAIR_MARKER) {
            self.wheelchair_accessible = true;
        }

        if span.contains(AVAILABLE_MARKER) {
            self.available = span
                .chars()
                .skip(AVAILABLE_PREFIX_LEN)
                .collect::<String>()
                .trim()
                .to_string();
        }
    }
}

fn first_match<T: Copy>(vocabulary: &[(&str, T)], text: &str) -> Option<T> {
    vocabulary
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, value)| *value)
}
