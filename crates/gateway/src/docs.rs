use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::request_password_reset,
        crate::routes::auth::confirm_password_reset,
        crate::routes::auth::change_password,
        crate::routes::auth::deactivate,
        crate::routes::auth::delete_account,
        crate::routes::auth::create_admin,
        crate::routes::listings::list_listings,
        crate::routes::listings::featured_listings,
        crate::routes::listings::get_listing,
        crate::routes::listings::contact_for_listing,
        crate::routes::brokers::list_brokers,
        crate::routes::brokers::contact_broker,
        crate::routes::admin::dashboard,
        crate::routes::admin::list_listings,
        crate::routes::admin::create_listing,
        crate::routes::admin::update_listing,
        crate::routes::admin::delete_listing,
        crate::routes::admin::set_status,
        crate::routes::admin::toggle_featured,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::profile::set_visibility,
        crate::routes::profile::update_schedule,
        crate::routes::media::upload_image
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::FieldErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::auth::MessageResponse,
            crate::routes::auth::PasswordResetRequest,
            crate::routes::auth::PasswordResetConfirmRequest,
            crate::routes::auth::ChangePasswordRequest,
            crate::routes::auth::CreateAdminRequest,
            crate::routes::models::ListingResponse,
            crate::routes::models::ListingsResponse,
            crate::routes::models::FilterResponse,
            crate::routes::models::ListingPageResponse,
            crate::routes::models::AdminListingPageResponse,
            crate::routes::models::ListingRequest,
            crate::routes::models::StatusRequest,
            crate::routes::models::StatsResponse,
            crate::routes::models::DashboardResponse,
            crate::routes::models::DayScheduleBody,
            crate::routes::models::ScheduleBody,
            crate::routes::models::BrokerResponse,
            crate::routes::models::BrokersResponse,
            crate::routes::models::ContactResponse,
            crate::routes::models::ProfileRequest,
            crate::routes::models::VisibilityRequest,
            crate::routes::models::MediaUploadRequest,
            crate::routes::models::MediaUploadResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Admin sessions, passwords and accounts"),
        (name = "Listings", description = "Public property catalog"),
        (name = "Brokers", description = "Public broker directory"),
        (name = "Admin", description = "Listing management for signed-in brokers"),
        (name = "Profile", description = "The signed-in broker's own profile"),
        (name = "Media", description = "Image hosting")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        components
            .security_schemes
            .insert("bearerAuth".to_string(), scheme);
    }
}
