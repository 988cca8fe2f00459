//! Explicit point-award endpoint for litter reports

use axum::{extract::State, Extension, Json};
use ecolink_common::db::models::Litter;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AuthUser;
use crate::db::observations;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEcoPointsRequest {
    pub litter_id: String,
    pub points: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEcoPointsResponse {
    pub litter: Litter,
    pub eco_points: i64,
}

/// POST /eco-points/add
///
/// Grants points for a litter report to its submitter and marks the report
/// awarded. A second call for the same report fails without granting
/// anything twice.
pub async fn add_eco_points(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AddEcoPointsRequest>,
) -> ApiResult<Json<AddEcoPointsResponse>> {
    if req.points <= 0 {
        return Err(ApiError::BadRequest("Points must be positive".to_string()));
    }

    let litter = observations::award_litter(&state.db, &req.litter_id, req.points).await?;

    info!(
        litter_id = %litter.id,
        points = req.points,
        awarded_by = %user.user_id,
        "Litter points awarded"
    );

    Ok(Json(AddEcoPointsResponse {
        litter,
        eco_points: req.points,
    }))
}
