use serde::Serialize;
use std::fmt;

/// Sentinel for counts and coordinates that could not be read
pub const NOT_AVAILABLE: &str = "N.A";

/// Sentinel for free-text fields that could not be read
pub const UNKNOWN: &str = "unknown";

/// One rental listing as extracted from its detail page
///
/// Every field has a default so a record can always be produced, no matter how
/// much of the page was missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: String,
    pub url: String,
    pub address: String,
    pub area: String,
    pub sub_area: String,
    pub posted_at: String,
    pub rent_per_week: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub square_feet: String,
    pub laundry: Laundry,
    pub house_type: HouseType,
    pub pets_allowed_dogs: bool,
    pub pets_allowed_cats: bool,
    pub furnished: bool,
    pub garage_type: GarageType,
    pub smoking_allowed: bool,
    pub wheelchair_accessible: bool,
    pub available_from: String,
    pub images: Vec<String>,
    pub location: Geolocation,
}

impl Default for ListingRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            url: String::new(),
            address: UNKNOWN.to_string(),
            area: String::new(),
            sub_area: String::new(),
            posted_at: String::new(),
            rent_per_week: String::new(),
            bedrooms: NOT_AVAILABLE.to_string(),
            bathrooms: NOT_AVAILABLE.to_string(),
            square_feet: String::new(),
            laundry: Laundry::Unknown,
            house_type: HouseType::Unknown,
            pets_allowed_dogs: false,
            pets_allowed_cats: false,
            furnished: false,
            garage_type: GarageType::Unknown,
            smoking_allowed: true,
            wheelchair_accessible: false,
            available_from: String::new(),
            images: Vec::new(),
            location: Geolocation::default(),
        }
    }
}

/// Latitude/longitude pair, kept verbatim as strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Geolocation {
    pub lat: String,
    pub long: String,
}

impl Default for Geolocation {
    fn default() -> Self {
        Self {
            lat: NOT_AVAILABLE.to_string(),
            long: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Laundry facilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Laundry {
    WasherDryerInUnit,
    WasherDryerHookups,
    LaundryInBuilding,
    LaundryOnSite,
    NoLaundryOnSite,
    #[default]
    Unknown,
}

impl Laundry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WasherDryerInUnit => "washer-dryer-in-unit",
            Self::WasherDryerHookups => "washer-dryer-hookups",
            Self::LaundryInBuilding => "laundry-in-building",
            Self::LaundryOnSite => "laundry-on-site",
            Self::NoLaundryOnSite => "no-laundry-on-site",
            Self::Unknown => "unknown",
        }
    }
}

/// Kind of dwelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HouseType {
    Apartment,
    Condo,
    #[serde(rename = "cottage/cabin")]
    CottageCabin,
    Duplex,
    Flat,
    House,
    InLaw,
    Loft,
    Townhouse,
    Manufactured,
    AssistedLiving,
    Land,
    #[default]
    Unknown,
}

impl HouseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::Condo => "condo",
            Self::CottageCabin => "cottage/cabin",
            Self::Duplex => "duplex",
            Self::Flat => "flat",
            Self::House => "house",
            Self::InLaw => "in-law",
            Self::Loft => "loft",
            Self::Townhouse => "townhouse",
            Self::Manufactured => "manufactured",
            Self::AssistedLiving => "assisted-living",
            Self::Land => "land",
            Self::Unknown => "unknown",
        }
    }
}

/// Parking arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GarageType {
    Carport,
    AttachedGarage,
    DetachedGarage,
    OffStreetParking,
    StreetParking,
    ValetParking,
    #[default]
    Unknown,
}

impl GarageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Carport => "carport",
            Self::AttachedGarage => "attached-garage",
            Self::DetachedGarage => "detached-garage",
            Self::OffStreetParking => "off-street-parking",
            Self::StreetParking => "street-parking",
            Self::ValetParking => "valet-parking",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Laundry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HouseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GarageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sentinels() {
        let record = ListingRecord::default();
        assert_eq!(record.address, "unknown");
        assert_eq!(record.bedrooms, "N.A");
        assert_eq!(record.bathrooms, "N.A");
        assert_eq!(record.location.lat, "N.A");
        assert!(record.smoking_allowed);
        assert!(!record.pets_allowed_dogs);
        assert!(!record.furnished);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(ListingRecord::default()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "id",
            "url",
            "subArea",
            "postedAt",
            "rentPerWeek",
            "squareFeet",
            "houseType",
            "petsAllowedDogs",
            "petsAllowedCats",
            "garageType",
            "smokingAllowed",
            "wheelchairAccessible",
            "availableFrom",
            "images",
            "location",
        ] {
            assert!(object.contains_key(key), "missing key {}", key);
        }
    }

    #[test]
    fn test_enum_serialization_matches_as_str() {
        for laundry in [
            Laundry::WasherDryerInUnit,
            Laundry::WasherDryerHookups,
            Laundry::LaundryInBuilding,
            Laundry::LaundryOnSite,
            Laundry::NoLaundryOnSite,
            Laundry::Unknown,
        ] {
            assert_eq!(
                serde_json::to_value(laundry).unwrap(),
                serde_json::Value::String(laundry.as_str().to_string())
            );
        }

        assert_eq!(
            serde_json::to_value(HouseType::CottageCabin).unwrap(),
            serde_json::Value::String("cottage/cabin".to_string())
        );
        assert_eq!(
            serde_json::to_value(HouseType::AssistedLiving).unwrap(),
            serde_json::Value::String("assisted-living".to_string())
        );
        assert_eq!(
            serde_json::to_value(GarageType::OffStreetParking).unwrap(),
            serde_json::Value::String("off-street-parking".to_string())
        );
    }
}
