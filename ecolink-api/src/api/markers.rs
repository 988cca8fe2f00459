//! Public map marker endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::observations::{self, Marker};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkersResponse {
    pub markers: Vec<Marker>,
}

/// GET /markers
pub async fn get_markers(State(state): State<AppState>) -> ApiResult<Json<MarkersResponse>> {
    let markers = observations::markers(&state.db).await?;
    Ok(Json(MarkersResponse { markers }))
}
