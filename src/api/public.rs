//! Public read-only endpoints.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::{Event, Member, SiteData};
use crate::AppState;

/// GET /api/events - All events in collection order.
pub async fn public_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.repo.list_events().await?))
}

/// GET /api/members - All members in collection order.
pub async fn public_members(State(state): State<AppState>) -> Result<Json<Vec<Member>>, AppError> {
    Ok(Json(state.repo.list_members().await?))
}

/// Club info keys that hold operator secrets and never leave the server.
const PRIVATE_CLUB_KEYS: &[&str] = &["api_config", "email_config", "admin_password"];

/// GET /api/data - Every public document in one payload.
pub async fn public_data(State(state): State<AppState>) -> Result<Json<SiteData>, AppError> {
    let mut data = state.repo.site_data().await?;
    data.club
        .extra
        .retain(|key, _| !PRIVATE_CLUB_KEYS.contains(&key.as_str()));
    Ok(Json(data))
}
