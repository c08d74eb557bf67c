//! Listing entity definitions

use serde::{Deserialize, Serialize};

/// A property advertised in the public catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Public document id.
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub neighborhood: String,
    pub city: String,
    pub address: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub suites: u32,
    pub closets: u32,
    pub garage_spaces: u32,
    pub area: Option<f64>,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub featured: bool,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Listing {
    /// First gallery image, used as the card cover.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Validated listing fields used for inserts and full updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub neighborhood: String,
    pub city: String,
    pub address: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub suites: u32,
    pub closets: u32,
    pub garage_spaces: u32,
    pub area: Option<f64>,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub featured: bool,
    pub images: Vec<String>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "casa")]
    House,
    #[serde(rename = "apartamento")]
    Apartment,
    #[serde(rename = "cobertura")]
    Penthouse,
    #[serde(rename = "terreno")]
    Land,
    #[serde(rename = "comercial")]
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Penthouse,
        PropertyType::Land,
        PropertyType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "casa",
            PropertyType::Apartment => "apartamento",
            PropertyType::Penthouse => "cobertura",
            PropertyType::Land => "terreno",
            PropertyType::Commercial => "comercial",
        }
    }

    /// Parse the stored code, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    #[serde(rename = "disponivel")]
    Available,
    #[serde(rename = "indisponivel")]
    Unavailable,
    #[serde(rename = "vendido")]
    Sold,
    #[serde(rename = "alugado")]
    Rented,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 4] = [
        ListingStatus::Available,
        ListingStatus::Unavailable,
        ListingStatus::Sold,
        ListingStatus::Rented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "disponivel",
            ListingStatus::Unavailable => "indisponivel",
            ListingStatus::Sold => "vendido",
            ListingStatus::Rented => "alugado",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-status counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStats {
    pub total: i64,
    pub available: i64,
    pub unavailable: i64,
    pub sold: i64,
    pub rented: i64,
    pub featured: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_codes_round_trip() {
        for kind in PropertyType::ALL {
            assert_eq!(PropertyType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PropertyType::parse(" Casa "), Some(PropertyType::House));
        assert_eq!(PropertyType::parse("castle"), None);
    }

    #[test]
    fn status_serializes_as_portuguese_code() {
        let json = serde_json::to_string(&ListingStatus::Rented).unwrap();
        assert_eq!(json, "\"alugado\"");
        let parsed: ListingStatus = serde_json::from_str("\"indisponivel\"").unwrap();
        assert_eq!(parsed, ListingStatus::Unavailable);
    }
}
