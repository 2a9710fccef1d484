//! Admin JSON API endpoints.
//!
//! Everything except `login` and `verify` sits behind the token layer.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::{self, session_credential};
use crate::errors::AppError;
use crate::models::{
    ClubInfo, ContactInfo, CreateEventRequest, CreateGalleryItemRequest, CreateMemberRequest,
    DashboardStats, Event, GalleryItem, Member, UpdateClubInfoRequest, UpdateContactInfoRequest,
    UpdateEventRequest, UpdateGalleryItemRequest, UpdateMemberRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub id: u64,
    pub show_in_events: bool,
}

/// POST /api/admin/login - Exchange credentials for a bearer token.
pub async fn api_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if !auth::check_credentials(&state.config, &request.username, &request.password) {
        tracing::warn!(username = %request.username, "Rejected admin API login");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.sessions.issue().await;
    success(LoginResponse {
        token,
        expires_in: state.sessions.ttl().num_seconds(),
    })
}

/// POST /api/admin/logout - Invalidate the presented token.
pub async fn api_logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    if let Some(value) = session_credential(&headers) {
        state.sessions.revoke(&value).await;
    }
    success(())
}

/// GET /api/admin/verify - Whether the presented token is still valid.
pub async fn api_verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<VerifyResponse> {
    match session_credential(&headers) {
        Some(value) if state.sessions.verify(&value).await => {
            success(VerifyResponse { valid: true })
        }
        _ => Err(AppError::Unauthorized("Invalid or expired token".to_string())),
    }
}

/// GET /api/admin/dashboard - Collection counts.
pub async fn api_dashboard(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    success(state.repo.dashboard().await?)
}

// ==================== SINGLETONS ====================

/// GET /api/admin/club-info
pub async fn api_get_club_info(State(state): State<AppState>) -> ApiResult<ClubInfo> {
    success(state.repo.get_club_info().await?)
}

/// PUT /api/admin/club-info - Overwrite the supplied fields.
pub async fn api_update_club_info(
    State(state): State<AppState>,
    Json(request): Json<UpdateClubInfoRequest>,
) -> ApiResult<ClubInfo> {
    success(state.repo.replace_club_info(&request).await?)
}

/// GET /api/admin/contact
pub async fn api_get_contact(State(state): State<AppState>) -> ApiResult<ContactInfo> {
    success(state.repo.get_contact_info().await?)
}

/// PUT /api/admin/contact - Overwrite the supplied fields.
pub async fn api_update_contact(
    State(state): State<AppState>,
    Json(request): Json<UpdateContactInfoRequest>,
) -> ApiResult<ContactInfo> {
    success(state.repo.replace_contact_info(&request).await?)
}

// ==================== EVENTS ====================

/// GET /api/admin/events - All events, hidden ones included.
pub async fn api_list_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    success(state.repo.list_events().await?)
}

/// GET /api/admin/events/{id}
pub async fn api_get_event(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Event> {
    success(state.repo.get_event(id).await?)
}

/// POST /api/admin/events - Create an event; the id is assigned here.
pub async fn api_create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<Event> {
    success(state.repo.create_event(request).await?)
}

/// PUT /api/admin/events/{id} - Partial update.
pub async fn api_update_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<Event> {
    success(state.repo.update_event(id, &request).await?)
}

/// DELETE /api/admin/events/{id}
pub async fn api_delete_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Event> {
    success(state.repo.delete_event(id).await?)
}

/// POST /api/admin/events/{id}/toggle-visibility
pub async fn api_toggle_event_visibility(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<VisibilityResponse> {
    let show_in_events = state.repo.toggle_event_visibility(id).await?;
    success(VisibilityResponse { id, show_in_events })
}

// ==================== MEMBERS ====================

/// GET /api/admin/members
pub async fn api_list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    success(state.repo.list_members().await?)
}

/// GET /api/admin/members/{index}
pub async fn api_get_member(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Member> {
    success(state.repo.get_member(index).await?)
}

/// POST /api/admin/members - Append a member.
pub async fn api_create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<Member> {
    success(state.repo.create_member(request).await?)
}

/// PUT /api/admin/members/{index} - Partial update.
pub async fn api_update_member(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<Member> {
    success(state.repo.update_member(index, &request).await?)
}

/// DELETE /api/admin/members/{index} - Later members shift down by one.
pub async fn api_delete_member(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Member> {
    success(state.repo.delete_member(index).await?)
}

// ==================== GALLERY ====================

/// GET /api/admin/gallery
pub async fn api_list_gallery(State(state): State<AppState>) -> ApiResult<Vec<GalleryItem>> {
    success(state.repo.list_gallery().await?)
}

/// GET /api/admin/gallery/{index}
pub async fn api_get_gallery_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<GalleryItem> {
    success(state.repo.get_gallery_item(index).await?)
}

/// POST /api/admin/gallery - Append an item.
pub async fn api_create_gallery_item(
    State(state): State<AppState>,
    Json(request): Json<CreateGalleryItemRequest>,
) -> ApiResult<GalleryItem> {
    success(state.repo.create_gallery_item(request).await?)
}

/// PUT /api/admin/gallery/{index} - Partial update.
pub async fn api_update_gallery_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<UpdateGalleryItemRequest>,
) -> ApiResult<GalleryItem> {
    success(state.repo.update_gallery_item(index, &request).await?)
}

/// DELETE /api/admin/gallery/{index} - Later items shift down by one.
pub async fn api_delete_gallery_item(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<GalleryItem> {
    success(state.repo.delete_gallery_item(index).await?)
}
