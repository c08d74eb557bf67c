use realty_auth::User;
use realty_catalog::{validate_profile, validate_schedule, ProfileInput};
use realty_database::{BrokerProfile, WeeklySchedule};

use super::media::{upload_data_url, warn_orphaned};
use crate::util::upload_name;
use crate::{ApiError, AppState};

/// Validate the profile form, upload a new portrait if one was sent, save.
pub async fn update_profile(
    state: &AppState,
    user: &User,
    input: &ProfileInput,
) -> Result<BrokerProfile, ApiError> {
    let mut profile = validate_profile(input)?;

    let mut uploaded = Vec::new();
    let pending = profile.photo_url.clone().filter(|p| p.starts_with("data:"));
    if let Some(photo) = pending {
        let name = upload_name(&format!("perfil {}", user.public_id), 0);
        let hosted = upload_data_url(state.image_host(), &photo, &name).await?;
        uploaded.push(hosted.url.clone());
        profile.photo_url = Some(hosted.url);
    }

    state
        .brokers()
        .update(user.id, &profile)
        .await
        .map_err(|error| {
            warn_orphaned(&uploaded, &error);
            ApiError::from(error)
        })
}

pub async fn update_schedule(
    state: &AppState,
    user: &User,
    schedule: &WeeklySchedule,
) -> Result<BrokerProfile, ApiError> {
    validate_schedule(schedule)?;
    Ok(state.brokers().update_schedule(user.id, schedule).await?)
}
