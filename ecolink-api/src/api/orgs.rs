//! Organization endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ecolink_common::db::models::{Organization, OrgType, Profile};
use serde::{Deserialize, Serialize};

use crate::api::AuthUser;
use crate::db::orgs::{self, NewOrganization};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn parse_org_type(raw: &str) -> Result<OrgType, ApiError> {
    raw.parse::<OrgType>()
        .map_err(|_| ApiError::BadRequest(format!("Unknown organization type: {}", raw)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrgRequest {
    pub name: String,
    pub phone_no: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrgResponse {
    pub org: Organization,
    pub profile: Profile,
}

/// POST /org/:orgType
pub async fn create_org(
    State(state): State<AppState>,
    Path(org_type): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateOrgRequest>,
) -> ApiResult<(StatusCode, Json<CreateOrgResponse>)> {
    let org_type = parse_org_type(&org_type)?;

    let (org, profile) = orgs::create_with_creator(
        &state.db,
        org_type,
        &NewOrganization {
            name: req.name,
            phone_no: req.phone_no,
            email: req.email,
        },
        &user.user_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CreateOrgResponse { org, profile })))
}

#[derive(Debug, Deserialize)]
pub struct JoinOrgRequest {
    /// Join code as handed out at organization creation
    pub organization_code: String,
}

/// POST /org/join/:orgType
pub async fn join_org(
    State(state): State<AppState>,
    Path(org_type): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<JoinOrgRequest>,
) -> ApiResult<Json<Profile>> {
    let org_type = parse_org_type(&org_type)?;

    let profile =
        orgs::join_by_code(&state.db, org_type, &req.organization_code, &user.user_id).await?;

    Ok(Json(profile))
}
