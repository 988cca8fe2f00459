//! Event and application endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use ecolink_common::db::models::{
    NgoEvent, NgoEventApplication, SchoolEvent, SchoolEventApplication,
};
use serde::{Deserialize, Serialize};

use crate::api::AuthUser;
use crate::db::{events, profiles};
use crate::db::events::NewEvent;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn default_page() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNgoEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Defaults to the caller's NGO affiliation
    pub ngo_id: Option<String>,
}

/// POST /ngo/event
pub async fn create_ngo_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateNgoEventRequest>,
) -> ApiResult<(StatusCode, Json<NgoEvent>)> {
    let org_id = match req.ngo_id {
        Some(id) => id,
        None => {
            let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
            profile.ngo_id.ok_or_else(|| {
                ApiError::BadRequest("No NGO given and caller has no NGO affiliation".to_string())
            })?
        }
    };

    let event = events::create_ngo_event(
        &state.db,
        &NewEvent {
            title: req.title,
            description: req.description,
            date: req.date,
            latitude: req.latitude,
            longitude: req.longitude,
            org_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchoolEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Defaults to the caller's school affiliation
    pub school_id: Option<String>,
}

/// POST /school/event
pub async fn create_school_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateSchoolEventRequest>,
) -> ApiResult<(StatusCode, Json<SchoolEvent>)> {
    let org_id = match req.school_id {
        Some(id) => id,
        None => {
            let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
            profile.school_id.ok_or_else(|| {
                ApiError::BadRequest(
                    "No school given and caller has no school affiliation".to_string(),
                )
            })?
        }
    };

    let event = events::create_school_event(
        &state.db,
        &NewEvent {
            title: req.title,
            description: req.description,
            date: req.date,
            latitude: req.latitude,
            longitude: req.longitude,
            org_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub event_id: String,
}

/// POST /ngo/event/apply
pub async fn apply_ngo_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<Json<NgoEventApplication>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
    let application = events::apply_ngo_event(&state.db, &req.event_id, &profile.id).await?;
    Ok(Json(application))
}

/// POST /school/event/apply
pub async fn apply_school_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<Json<SchoolEventApplication>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
    let application = events::apply_school_event(&state.db, &req.event_id, &profile.id).await?;
    Ok(Json(application))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsResponse {
    pub applications: Vec<SchoolEventApplication>,
}

/// GET /school/event/applications/:eventId
pub async fn school_event_applications(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<Json<ApplicationsResponse>> {
    let applications = events::applications_for_school_event(&state.db, &event_id).await?;
    Ok(Json(ApplicationsResponse { applications }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoEventsResponse {
    pub events: Vec<NgoEvent>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// GET /ngo/events
pub async fn list_ngo_events(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<NgoEventsResponse>> {
    let (events, p) = events::list_ngo_events(&state.db, query.page).await?;
    Ok(Json(NgoEventsResponse {
        events,
        total_pages: p.total_pages,
        current_page: p.page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SchoolEventsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    /// Optional school filter
    pub school_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolEventsResponse {
    pub events: Vec<SchoolEvent>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// GET /school/events
pub async fn list_school_events(
    State(state): State<AppState>,
    Query(query): Query<SchoolEventsQuery>,
) -> ApiResult<Json<SchoolEventsResponse>> {
    let (events, p) =
        events::list_school_events(&state.db, query.page, query.school_id.as_deref()).await?;
    Ok(Json(SchoolEventsResponse {
        events,
        total_pages: p.total_pages,
        current_page: p.page,
    }))
}
