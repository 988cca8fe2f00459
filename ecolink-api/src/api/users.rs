//! Contributor profile endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ecolink_common::db::models::{Profile, Role};
use serde::Deserialize;
use tracing::info;

use crate::api::AuthUser;
use crate::db::profiles::{self, NewProfile};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub profile_pic: Option<String>,
}

/// POST /user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let profile = profiles::create(
        &state.db,
        NewProfile {
            user_id: user.user_id,
            full_name: req.full_name,
            email: req.email,
            role: req.role,
            profile_pic: req.profile_pic,
        },
    )
    .await?;

    info!(profile_id = %profile.id, "Profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /user/:userId
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Profile>> {
    let profile = profiles::get_by_user_id(&state.db, &user_id).await?;
    Ok(Json(profile))
}
