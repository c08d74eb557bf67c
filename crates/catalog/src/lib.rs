//! Listing catalog rules shared by the public site and the admin back-office:
//! search and sort, pagination, Brazilian formatting, the featured cap,
//! form validation and contact links.

use realty_database::Listing;
use serde::Serialize;
use thiserror::Error;

pub mod contact;
pub mod featured;
pub mod filter;
pub mod format;
pub mod pagination;
pub mod validation;

pub use contact::ContactLinks;
pub use featured::{check_toggle, MAX_FEATURED};
pub use filter::{apply, filter_brokers, ListingFilter, ListingQuery, SortKey};
pub use pagination::{paginate, Page, DEFAULT_PAGE_SIZE};
pub use validation::{
    validate_listing, validate_profile, validate_schedule, FieldError, ListingInput,
    ProfileInput, ValidationErrors,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid value {value:?} for filter {field}")]
    InvalidFilter { field: &'static str, value: String },
    #[error("listing {0} not found")]
    NotFound(String),
    #[error("featured limit of {limit} listings reached")]
    FeaturedLimitReached { limit: usize },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// A filtered, sorted and paginated slice of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    #[serde(flatten)]
    pub page: Page<Listing>,
    pub filter: ListingFilter,
    /// Present when nothing matched, so a client can offer "clear filters".
    pub cleared_filter: Option<ListingFilter>,
}

/// Run a raw query over the full collection.
pub fn browse(
    listings: &[Listing],
    query: &ListingQuery,
    default_page_size: usize,
) -> Result<CatalogView, CatalogError> {
    let filter = query.to_filter()?;
    let matched = apply(listings, &filter);

    let per_page = query.per_page.filter(|n| *n > 0).unwrap_or(default_page_size);
    let page = paginate(&matched, query.page.unwrap_or(1), per_page);

    let cleared_filter = (page.total_items == 0).then(ListingFilter::default);

    Ok(CatalogView {
        page,
        filter,
        cleared_filter,
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use realty_database::{
        BrokerProfile, Listing, ListingStatus, PropertyType, WeeklySchedule,
    };

    pub fn listing(id: &str, title: &str, neighborhood: &str, city: &str, price: Option<f64>) -> Listing {
        Listing {
            id: id.to_string(),
            title: title.to_string(),
            description: "Descrição".to_string(),
            price,
            neighborhood: neighborhood.to_string(),
            city: city.to_string(),
            address: None,
            bedrooms: 2,
            bathrooms: 1,
            suites: 0,
            closets: 0,
            garage_spaces: 1,
            area: Some(100.0),
            property_type: PropertyType::House,
            status: ListingStatus::Available,
            featured: false,
            images: Vec::new(),
            features: Vec::new(),
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000000Z".to_string(),
        }
    }

    pub fn broker(name: &str, creci: &str) -> BrokerProfile {
        BrokerProfile {
            id: format!("id-{}", name.to_lowercase()),
            user_id: 1,
            name: name.to_string(),
            creci: creci.to_string(),
            phone: "86999998888".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            photo_url: None,
            whatsapp: None,
            facebook_username: None,
            instagram_username: None,
            schedule: WeeklySchedule::default(),
            is_public: true,
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000000Z".to_string(),
        }
    }
}
