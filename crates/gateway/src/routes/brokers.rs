use axum::{
    extract::{Path, State},
    Json,
};
use realty_catalog::{contact::broker_contact, filter_brokers};
use realty_database::BrokerError;

use crate::routes::models::{BrokerResponse, BrokerSearchParams, BrokersResponse, ContactResponse};
use crate::{ApiError, ApiQuery, AppState};

#[utoipa::path(
    get,
    path = "/api/brokers",
    tag = "Brokers",
    params(BrokerSearchParams),
    responses((status = 200, description = "Public broker profiles sorted by name", body = BrokersResponse))
)]
pub async fn list_brokers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BrokerSearchParams>,
) -> Result<Json<BrokersResponse>, ApiError> {
    let profiles = state.brokers().list_public().await?;
    let brokers = filter_brokers(&profiles, params.search.as_deref())
        .into_iter()
        .map(BrokerResponse::from)
        .collect();
    Ok(Json(BrokersResponse { brokers }))
}

#[utoipa::path(
    get,
    path = "/api/brokers/{id}/contact",
    tag = "Brokers",
    params(("id" = String, Path, description = "Broker id")),
    responses(
        (status = 200, description = "General inquiry links", body = ContactResponse),
        (status = 404, description = "No public broker with this id", body = crate::error::ErrorResponse)
    )
)]
pub async fn contact_broker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let broker = state
        .brokers()
        .find_by_public_id(&id)
        .await?
        .filter(|broker| broker.is_public)
        .ok_or(BrokerError::ProfileNotFound)?;

    Ok(Json(broker_contact(&broker).into()))
}
