use realty_catalog::{
    format::{display_price, format_phone, status_label, type_label},
    CatalogView, ContactLinks, ListingFilter, ListingInput, ListingQuery, ProfileInput,
};
use realty_database::{BrokerProfile, DaySchedule, Listing, ListingStats, WeeklySchedule};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    /// `R$ 850.000,00` or `Consulte`.
    pub price_display: String,
    pub neighborhood: String,
    pub city: String,
    pub address: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub suites: u32,
    pub closets: u32,
    pub garage_spaces: u32,
    pub area: Option<f64>,
    pub property_type: String,
    pub type_label: String,
    pub status: String,
    pub status_label: String,
    pub featured: bool,
    pub cover_image: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            price_display: display_price(listing.price),
            type_label: type_label(listing.property_type).to_string(),
            status_label: status_label(listing.status).to_string(),
            cover_image: listing.cover_image().map(str::to_string),
            property_type: listing.property_type.as_str().to_string(),
            status: listing.status.as_str().to_string(),
            id: listing.id,
            title: listing.title,
            description: listing.description,
            price: listing.price,
            neighborhood: listing.neighborhood,
            city: listing.city,
            address: listing.address,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            suites: listing.suites,
            closets: listing.closets,
            garage_spaces: listing.garage_spaces,
            area: listing.area,
            featured: listing.featured,
            images: listing.images,
            features: listing.features,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListingsResponse {
    pub listings: Vec<ListingResponse>,
}

impl From<Vec<Listing>> for ListingsResponse {
    fn from(listings: Vec<Listing>) -> Self {
        Self {
            listings: listings.into_iter().map(ListingResponse::from).collect(),
        }
    }
}

/// The filter actually applied, echoed back with canonical values.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterResponse {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub sort: String,
}

impl From<ListingFilter> for FilterResponse {
    fn from(filter: ListingFilter) -> Self {
        Self {
            search: filter.search,
            property_type: filter.property_type.map(|t| t.as_str().to_string()),
            status: filter.status.map(|s| s.as_str().to_string()),
            city: filter.city,
            min_price: filter.min_price,
            max_price: filter.max_price,
            min_area: filter.min_area,
            max_area: filter.max_area,
            bedrooms: filter.min_bedrooms,
            bathrooms: filter.min_bathrooms,
            sort: filter.sort.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListingPageResponse {
    pub items: Vec<ListingResponse>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub filter: FilterResponse,
    /// Present when nothing matched: the filter a "clear filters" action applies.
    pub cleared_filter: Option<FilterResponse>,
}

impl From<CatalogView> for ListingPageResponse {
    fn from(view: CatalogView) -> Self {
        Self {
            items: view.page.items.into_iter().map(ListingResponse::from).collect(),
            page: view.page.page,
            per_page: view.page.per_page,
            total_items: view.page.total_items,
            total_pages: view.page.total_pages,
            filter: view.filter.into(),
            cleared_filter: view.cleared_filter.map(FilterResponse::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminListingPageResponse {
    #[serde(flatten)]
    pub page: ListingPageResponse,
    pub featured_count: usize,
    pub featured_limit: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQueryParams {
    /// Matches title, neighborhood or city.
    pub search: Option<String>,
    /// `casa`, `apartamento`, `cobertura`, `terreno`, `comercial` or `all`.
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    /// `disponivel`, `indisponivel`, `vendido`, `alugado` or `all`.
    pub status: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_area: Option<String>,
    pub max_area: Option<String>,
    /// Minimum bedrooms; `4+` is accepted.
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    /// `newest`, `price-low`, `price-high`, `area-small` or `area-large`.
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl From<ListingQueryParams> for ListingQuery {
    fn from(params: ListingQueryParams) -> Self {
        Self {
            search: params.search,
            property_type: params.property_type,
            status: params.status,
            city: params.city,
            min_price: params.min_price,
            max_price: params.max_price,
            min_area: params.min_area,
            max_area: params.max_area,
            bedrooms: params.bedrooms,
            bathrooms: params.bathrooms,
            sort: params.sort,
            page: params.page,
            per_page: params.per_page,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub suites: Option<u32>,
    pub closets: Option<u32>,
    pub garage_spaces: Option<u32>,
    pub area: Option<f64>,
    #[serde(alias = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    /// Hosted URLs or `data:image/...;base64,` payloads to upload.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl From<ListingRequest> for ListingInput {
    fn from(request: ListingRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            price: request.price,
            neighborhood: request.neighborhood,
            city: request.city,
            address: request.address,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            suites: request.suites,
            closets: request.closets,
            garage_spaces: request.garage_spaces,
            area: request.area,
            property_type: request.property_type,
            status: request.status,
            featured: request.featured,
            images: request.images,
            features: request.features,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total: i64,
    pub available: i64,
    pub unavailable: i64,
    pub sold: i64,
    pub rented: i64,
    pub featured: i64,
}

impl From<ListingStats> for StatsResponse {
    fn from(stats: ListingStats) -> Self {
        Self {
            total: stats.total,
            available: stats.available,
            unavailable: stats.unavailable,
            sold: stats.sold,
            rented: stats.rented,
            featured: stats.featured,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: StatsResponse,
    pub featured_limit: usize,
    pub recent: Vec<ListingResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DayScheduleBody {
    pub active: bool,
    /// `HH:MM`
    pub start: String,
    /// `HH:MM`
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ScheduleBody {
    pub monday: DayScheduleBody,
    pub tuesday: DayScheduleBody,
    pub wednesday: DayScheduleBody,
    pub thursday: DayScheduleBody,
    pub friday: DayScheduleBody,
    pub saturday: DayScheduleBody,
    pub sunday: DayScheduleBody,
}

impl Default for ScheduleBody {
    fn default() -> Self {
        WeeklySchedule::default().into()
    }
}

impl From<DaySchedule> for DayScheduleBody {
    fn from(day: DaySchedule) -> Self {
        Self {
            active: day.active,
            start: day.start,
            end: day.end,
        }
    }
}

impl From<DayScheduleBody> for DaySchedule {
    fn from(day: DayScheduleBody) -> Self {
        Self {
            active: day.active,
            start: day.start,
            end: day.end,
        }
    }
}

impl From<WeeklySchedule> for ScheduleBody {
    fn from(schedule: WeeklySchedule) -> Self {
        Self {
            monday: schedule.monday.into(),
            tuesday: schedule.tuesday.into(),
            wednesday: schedule.wednesday.into(),
            thursday: schedule.thursday.into(),
            friday: schedule.friday.into(),
            saturday: schedule.saturday.into(),
            sunday: schedule.sunday.into(),
        }
    }
}

impl From<ScheduleBody> for WeeklySchedule {
    fn from(body: ScheduleBody) -> Self {
        Self {
            monday: body.monday.into(),
            tuesday: body.tuesday.into(),
            wednesday: body.wednesday.into(),
            thursday: body.thursday.into(),
            friday: body.friday.into(),
            saturday: body.saturday.into(),
            sunday: body.sunday.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrokerResponse {
    pub id: String,
    pub name: String,
    pub creci: String,
    pub phone: String,
    /// `(86) 99999-8888`
    pub phone_display: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub whatsapp: Option<String>,
    pub facebook_username: Option<String>,
    pub instagram_username: Option<String>,
    pub schedule: ScheduleBody,
    pub is_public: bool,
}

impl From<BrokerProfile> for BrokerResponse {
    fn from(profile: BrokerProfile) -> Self {
        Self {
            phone_display: format_phone(&profile.phone),
            id: profile.id,
            name: profile.name,
            creci: profile.creci,
            phone: profile.phone,
            email: profile.email,
            photo_url: profile.photo_url,
            whatsapp: profile.whatsapp,
            facebook_username: profile.facebook_username,
            instagram_username: profile.instagram_username,
            schedule: profile.schedule.into(),
            is_public: profile.is_public,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrokersResponse {
    pub brokers: Vec<BrokerResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrokerSearchParams {
    /// Matches name or CRECI.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactParams {
    /// Public id of the broker to contact.
    pub broker: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub maps_search: Option<String>,
    pub maps_directions: Option<String>,
}

impl From<ContactLinks> for ContactResponse {
    fn from(links: ContactLinks) -> Self {
        Self {
            whatsapp: links.whatsapp,
            email: links.email,
            maps_search: links.maps_search,
            maps_directions: links.maps_directions,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub creci: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Hosted URL or a `data:image/...;base64,` payload to upload.
    pub photo_url: Option<String>,
    pub whatsapp: Option<String>,
    pub facebook_username: Option<String>,
    pub instagram_username: Option<String>,
}

impl From<ProfileRequest> for ProfileInput {
    fn from(request: ProfileRequest) -> Self {
        Self {
            name: request.name,
            creci: request.creci,
            phone: request.phone,
            email: request.email,
            photo_url: request.photo_url,
            whatsapp: request.whatsapp,
            facebook_username: request.facebook_username,
            instagram_username: request.instagram_username,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaUploadRequest {
    /// `data:image/<type>;base64,<payload>`
    pub image: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaUploadResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_database::{ListingStatus, PropertyType};

    #[test]
    fn listing_response_carries_display_labels() {
        let listing = Listing {
            id: "abc".into(),
            title: "Casa".into(),
            description: "Casa ampla".into(),
            price: None,
            neighborhood: "Jóquei".into(),
            city: "Teresina".into(),
            address: None,
            bedrooms: 3,
            bathrooms: 2,
            suites: 1,
            closets: 0,
            garage_spaces: 2,
            area: Some(200.0),
            property_type: PropertyType::Penthouse,
            status: ListingStatus::Rented,
            featured: false,
            images: vec!["https://i.ibb.co/a.jpg".into(), "https://i.ibb.co/b.jpg".into()],
            features: vec![],
            created_at: "2025-01-01T00:00:00.000000Z".into(),
            updated_at: "2025-01-01T00:00:00.000000Z".into(),
        };

        let response = ListingResponse::from(listing);
        assert_eq!(response.price_display, "Consulte");
        assert_eq!(response.property_type, "cobertura");
        assert_eq!(response.type_label, "Cobertura");
        assert_eq!(response.status_label, "Alugado");
        assert_eq!(response.cover_image.as_deref(), Some("https://i.ibb.co/a.jpg"));
    }

    #[test]
    fn schedule_body_defaults_to_business_hours() {
        let body: ScheduleBody = serde_json::from_str(r#"{"sunday":{"active":true,"start":"09:00","end":"12:00"}}"#)
            .unwrap();
        assert!(body.monday.active);
        assert_eq!(body.monday.start, "08:00");
        assert!(body.sunday.active);

        let schedule = WeeklySchedule::from(body);
        assert_eq!(schedule.sunday, DaySchedule::open("09:00", "12:00"));
    }
}
