//! Search, filtering and sorting over an in-memory listing collection.
//!
//! The public catalog, the admin table and the broker picker all run
//! through these functions, so every surface agrees on what matches.

use realty_database::{BrokerProfile, Listing, ListingStatus, PropertyType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::CatalogError;

/// Query-string values meaning "no constraint".
const SENTINELS: [&str; 2] = ["all", "any"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "area-small")]
    AreaSmall,
    #[serde(rename = "area-large")]
    AreaLarge,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::AreaSmall => "area-small",
            SortKey::AreaLarge => "area-large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            SortKey::Newest,
            SortKey::PriceLow,
            SortKey::PriceHigh,
            SortKey::AreaSmall,
            SortKey::AreaLarge,
        ]
        .into_iter()
        .find(|key| key.as_str() == value.trim())
    }
}

/// Active predicates. `None` means the predicate is off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<ListingStatus>,
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub sort: SortKey,
}

impl ListingFilter {
    /// Whether `listing` satisfies every active predicate.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [&listing.title, &listing.neighborhood, &listing.city]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if self.property_type.is_some_and(|kind| kind != listing.property_type) {
            return false;
        }

        if self.status.is_some_and(|status| status != listing.status) {
            return false;
        }

        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if listing.city.trim().to_lowercase() != city.to_lowercase() {
                return false;
            }
        }

        let price = listing.price.unwrap_or(0.0);
        let area = listing.area.unwrap_or(0.0);

        within(price, self.min_price, self.max_price)
            && within(area, self.min_area, self.max_area)
            && self.min_bedrooms.map_or(true, |min| listing.bedrooms >= min)
            && self.min_bathrooms.map_or(true, |min| listing.bathrooms >= min)
    }
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Return the listings matching `filter`, ordered by its sort key.
/// Ties keep their collection order.
pub fn apply(listings: &[Listing], filter: &ListingFilter) -> Vec<Listing> {
    let mut matched: Vec<Listing> = listings
        .iter()
        .filter(|listing| filter.matches(listing))
        .cloned()
        .collect();

    sort_listings(&mut matched, filter.sort);
    matched
}

pub fn sort_listings(listings: &mut [Listing], key: SortKey) {
    let price = |listing: &Listing| listing.price.unwrap_or(0.0);
    let area = |listing: &Listing| listing.area.unwrap_or(0.0);

    match key {
        SortKey::Newest => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PriceLow => listings.sort_by(|a, b| compare(price(a), price(b))),
        SortKey::PriceHigh => listings.sort_by(|a, b| compare(price(b), price(a))),
        SortKey::AreaSmall => listings.sort_by(|a, b| compare(area(a), area(b))),
        SortKey::AreaLarge => listings.sort_by(|a, b| compare(area(b), area(a))),
    }
}

fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Raw catalog query as it arrives in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_area: Option<String>,
    pub max_area: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ListingQuery {
    pub fn to_filter(&self) -> Result<ListingFilter, CatalogError> {
        Ok(ListingFilter {
            search: active(&self.search).map(str::to_string),
            property_type: active(&self.property_type)
                .map(|value| {
                    PropertyType::parse(value).ok_or_else(|| invalid("type", value))
                })
                .transpose()?,
            status: active(&self.status)
                .map(|value| ListingStatus::parse(value).ok_or_else(|| invalid("status", value)))
                .transpose()?,
            city: active(&self.city).map(str::to_string),
            min_price: number("min_price", &self.min_price)?,
            max_price: number("max_price", &self.max_price)?,
            min_area: number("min_area", &self.min_area)?,
            max_area: number("max_area", &self.max_area)?,
            min_bedrooms: count("bedrooms", &self.bedrooms)?,
            min_bathrooms: count("bathrooms", &self.bathrooms)?,
            sort: active(&self.sort)
                .map(|value| SortKey::parse(value).ok_or_else(|| invalid("sort", value)))
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(v)))
}

fn number(field: &'static str, value: &Option<String>) -> Result<Option<f64>, CatalogError> {
    active(value)
        .map(|raw| {
            raw.parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
                .ok_or_else(|| invalid(field, raw))
        })
        .transpose()
}

fn count(field: &'static str, value: &Option<String>) -> Result<Option<u32>, CatalogError> {
    active(value)
        .map(|raw| {
            // "4+" in the picker means four or more.
            raw.trim_end_matches('+')
                .parse::<u32>()
                .map_err(|_| invalid(field, raw))
        })
        .transpose()
}

fn invalid(field: &'static str, value: &str) -> CatalogError {
    CatalogError::InvalidFilter {
        field,
        value: value.to_string(),
    }
}

/// Public profiles whose name or CRECI contains `search`, sorted by name.
pub fn filter_brokers(profiles: &[BrokerProfile], search: Option<&str>) -> Vec<BrokerProfile> {
    let term = search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<BrokerProfile> = profiles
        .iter()
        .filter(|profile| profile.is_public)
        .filter(|profile| match &term {
            Some(term) => {
                profile.name.to_lowercase().contains(term)
                    || profile.creci.to_lowercase().contains(term)
            }
            None => true,
        })
        .cloned()
        .collect();

    matched.sort_by_key(|profile| profile.name.to_lowercase());
    matched
}
