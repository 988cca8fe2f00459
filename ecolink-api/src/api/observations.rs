//! Observation upload pipeline and read endpoints
//!
//! Uploads arrive as multipart submissions: binary image parts interleaved
//! with plain text metadata fields. Each binary part's declared content
//! type is checked against the image allow-list before anything is sent to
//! object storage; text fields are collected into a raw string map and
//! parsed into a typed record afterwards.
//!
//! Plant and animal submissions are classified (best-effort) and rewarded
//! immediately; litter persists unawarded and is rewarded later through
//! `POST /eco-points/add`.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use ecolink_common::db::models::{Animal, Litter, Plant};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::api::events::PageQuery;
use crate::api::AuthUser;
use crate::db::observations::{self, NewAnimal, NewLitter, NewPlant};
use crate::db::profiles;
use crate::error::{ApiError, ApiResult};
use crate::services::reward;
use crate::services::storage::StoredObject;
use crate::AppState;

/// Accepted image content types
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Per-observation-type storage folders
const PLANT_PREFIX: &str = "plant-images";
const LITTER_PREFIX: &str = "litter-images";
const ANIMAL_PREFIX: &str = "animal-images";

/// A binary part that passed validation and was stored
struct UploadedImage {
    stored: StoredObject,
    /// Buffered bytes, kept for image-based classification
    bytes: Vec<u8>,
    content_type: String,
}

/// Walk the multipart body: validate and store binary parts, collect text
/// fields into a raw metadata map
///
/// Parts are processed in order; an unsupported content type aborts the
/// submission immediately (parts stored before the rejected one are left
/// behind in object storage).
async fn collect_parts(
    state: &AppState,
    mut multipart: Multipart,
    prefix: &str,
) -> Result<(HashMap<String, String>, HashMap<String, UploadedImage>), ApiError> {
    let mut fields = HashMap::new();
    let mut images = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or("file").to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
                    return Err(ApiError::BadRequest(format!(
                        "Unsupported content type: {}",
                        content_type
                    )));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read part: {}", e)))?
                    .to_vec();

                let stored = state
                    .storage
                    .put(bytes.clone(), &file_name, &content_type, prefix)
                    .await
                    .map_err(|e| ApiError::Internal(format!("Upload failed: {}", e)))?;

                images.insert(
                    field_name,
                    UploadedImage {
                        stored,
                        bytes,
                        content_type,
                    },
                );
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;
                fields.insert(field_name, value);
            }
        }
    }

    Ok((fields, images))
}

fn require_field<'a>(
    fields: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ApiError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ApiError::BadRequest(format!("Missing field: {}", name)))
}

/// Parse latitude/longitude from the metadata map; malformed or
/// non-finite values are rejected before anything is persisted
fn parse_coordinates(fields: &HashMap<String, String>) -> Result<(f64, f64), ApiError> {
    let latitude = require_field(fields, "latitude")?
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::BadRequest("Invalid latitude".to_string()))?;
    let longitude = require_field(fields, "longitude")?
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::BadRequest("Invalid longitude".to_string()))?;

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(ApiError::BadRequest("Invalid coordinates".to_string()));
    }

    Ok((latitude, longitude))
}

fn require_image(
    images: &mut HashMap<String, UploadedImage>,
    name: &str,
) -> Result<UploadedImage, ApiError> {
    images
        .remove(name)
        .ok_or_else(|| ApiError::BadRequest(format!("Missing image part: {}", name)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantUploadResponse {
    pub plant: Plant,
    pub eco_points: i64,
}

/// POST /plants/upload
pub async fn upload_plant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<PlantUploadResponse>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;

    let (fields, mut images) = collect_parts(&state, multipart, PLANT_PREFIX).await?;
    let name = require_field(&fields, "name")?.to_string();
    let (latitude, longitude) = parse_coordinates(&fields)?;
    let image = require_image(&mut images, "image")?;

    let classification = state.classifier.classify_name(&name).await;
    let points = reward::points_for_rarity(classification.rarity);

    let plant = observations::insert_plant_with_award(
        &state.db,
        &NewPlant {
            name,
            latitude,
            longitude,
            image_url: image.stored.url,
            rarity: classification.rarity,
            description: classification.description,
            profile_id: profile.id,
        },
        points,
    )
    .await?;

    info!(plant_id = %plant.id, rarity = plant.rarity, points, "Plant observation recorded");

    Ok(Json(PlantUploadResponse {
        plant,
        eco_points: points,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalUploadResponse {
    pub animal: Animal,
    pub eco_points: i64,
}

/// POST /animal/upload
pub async fn upload_animal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<AnimalUploadResponse>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;

    let (fields, mut images) = collect_parts(&state, multipart, ANIMAL_PREFIX).await?;
    let (latitude, longitude) = parse_coordinates(&fields)?;
    let image = require_image(&mut images, "image")?;

    let classification = state
        .classifier
        .classify_image(&image.bytes, &image.content_type)
        .await;
    let points = reward::points_for_rarity(classification.rarity);

    let animal = observations::insert_animal_with_award(
        &state.db,
        &NewAnimal {
            latitude,
            longitude,
            image_url: image.stored.url,
            rarity: classification.rarity,
            description: classification.description,
            profile_id: profile.id,
        },
        points,
    )
    .await?;

    info!(animal_id = %animal.id, rarity = animal.rarity, points, "Animal observation recorded");

    Ok(Json(AnimalUploadResponse {
        animal,
        eco_points: points,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LitterUploadResponse {
    pub litter: Litter,
}

/// POST /litter/upload
///
/// Litter needs a before/after image pair and is never classified; it
/// persists unawarded until an authorized caller grants points.
pub async fn upload_litter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<LitterUploadResponse>)> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;

    let (fields, mut images) = collect_parts(&state, multipart, LITTER_PREFIX).await?;
    let (latitude, longitude) = parse_coordinates(&fields)?;
    let before = require_image(&mut images, "beforeImage")?;
    let after = require_image(&mut images, "afterImage")?;

    let litter = observations::insert_litter(
        &state.db,
        &NewLitter {
            latitude,
            longitude,
            before_image_url: before.stored.url,
            after_image_url: after.stored.url,
            profile_id: profile.id,
        },
    )
    .await?;

    info!(litter_id = %litter.id, "Litter report recorded (unawarded)");

    Ok((StatusCode::CREATED, Json(LitterUploadResponse { litter })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantsPage {
    pub plants: Vec<Plant>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// GET /plants/student
pub async fn plants_by_student(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PlantsPage>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
    let (plants, p) = observations::plants_by_profile(&state.db, &profile.id, query.page).await?;
    Ok(Json(PlantsPage {
        plants,
        total_pages: p.total_pages,
        current_page: p.page,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalsPage {
    pub animals: Vec<Animal>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// GET /animals/student
pub async fn animals_by_student(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<AnimalsPage>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
    let (animals, p) =
        observations::animals_by_profile(&state.db, &profile.id, query.page).await?;
    Ok(Json(AnimalsPage {
        animals,
        total_pages: p.total_pages,
        current_page: p.page,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LittersPage {
    pub litters: Vec<Litter>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// GET /litters/student
pub async fn litters_by_student(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<LittersPage>> {
    let profile = profiles::get_by_user_id(&state.db, &user.user_id).await?;
    let (litters, p) =
        observations::litters_by_profile(&state.db, &profile.id, query.page).await?;
    Ok(Json(LittersPage {
        litters,
        total_pages: p.total_pages,
        current_page: p.page,
    }))
}

/// GET /litters/school/:schoolId
pub async fn litters_by_school(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<LittersPage>> {
    let (litters, p) =
        observations::litters_by_school(&state.db, &school_id, query.page).await?;
    Ok(Json(LittersPage {
        litters,
        total_pages: p.total_pages,
        current_page: p.page,
    }))
}
