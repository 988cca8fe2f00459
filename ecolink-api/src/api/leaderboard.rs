//! Public leaderboard endpoint

use axum::{extract::State, Json};
use ecolink_common::db::models::Profile;
use serde::Serialize;

use crate::db::profiles;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<Profile>,
}

/// GET /leaderboard
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<Json<LeaderboardResponse>> {
    let leaderboard = profiles::leaderboard(&state.db).await?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}
