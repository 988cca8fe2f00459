//! Observation queries
//!
//! Persisting a rewarded observation and incrementing the contributor's
//! point total happen in one transaction. The point update is an SQL-level
//! increment (`eco_points = eco_points + ?`), never an application-side
//! read-modify-write, so concurrent awards for the same contributor both
//! land.

use crate::pagination::{calculate_pagination, Pagination, PAGE_SIZE};
use chrono::Utc;
use ecolink_common::db::models::{Animal, Litter, Plant};
use ecolink_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewPlant {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub rarity: i64,
    pub description: String,
    pub profile_id: String,
}

#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub rarity: i64,
    pub description: String,
    pub profile_id: String,
}

#[derive(Debug, Clone)]
pub struct NewLitter {
    pub latitude: f64,
    pub longitude: f64,
    pub before_image_url: String,
    pub after_image_url: String,
    pub profile_id: String,
}

/// Map marker for any observation kind
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
}

/// Insert a plant sighting and award points to its contributor atomically
pub async fn insert_plant_with_award(
    pool: &SqlitePool,
    new: &NewPlant,
    points: i64,
) -> Result<Plant> {
    let id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO plants (id, name, latitude, longitude, image_url, rarity, description, profile_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.name)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.image_url)
    .bind(new.rarity)
    .bind(&new.description)
    .bind(&new.profile_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE profiles SET eco_points = eco_points + ? WHERE id = ?")
        .bind(points)
        .bind(&new.profile_id)
        .execute(&mut *tx)
        .await?;

    let plant = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE id = ?")
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(plant)
}

/// Insert an animal sighting and award points to its contributor atomically
pub async fn insert_animal_with_award(
    pool: &SqlitePool,
    new: &NewAnimal,
    points: i64,
) -> Result<Animal> {
    let id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO animals (id, latitude, longitude, image_url, rarity, description, profile_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.image_url)
    .bind(new.rarity)
    .bind(&new.description)
    .bind(&new.profile_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE profiles SET eco_points = eco_points + ? WHERE id = ?")
        .bind(points)
        .bind(&new.profile_id)
        .execute(&mut *tx)
        .await?;

    let animal = sqlx::query_as::<_, Animal>("SELECT * FROM animals WHERE id = ?")
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(animal)
}

/// Insert a litter report; points are deferred to an explicit award call
pub async fn insert_litter(pool: &SqlitePool, new: &NewLitter) -> Result<Litter> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO litters (id, latitude, longitude, before_image_url, after_image_url, is_awarded, profile_id, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.before_image_url)
    .bind(&new.after_image_url)
    .bind(&new.profile_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Litter>("SELECT * FROM litters WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}

/// Award points for a litter report to its submitter
///
/// Mark-then-award inside one transaction: the awarded flag is flipped
/// first with a guard on its current value, so a retried or concurrent
/// award cannot grant points twice.
pub async fn award_litter(pool: &SqlitePool, litter_id: &str, points: i64) -> Result<Litter> {
    let mut tx = pool.begin().await?;

    let marked = sqlx::query("UPDATE litters SET is_awarded = 1 WHERE id = ? AND is_awarded = 0")
        .bind(litter_id)
        .execute(&mut *tx)
        .await?;

    if marked.rows_affected() == 0 {
        let existing: Option<(bool,)> =
            sqlx::query_as("SELECT is_awarded FROM litters WHERE id = ?")
                .bind(litter_id)
                .fetch_optional(&mut *tx)
                .await?;
        return match existing {
            None => Err(Error::NotFound(format!("Litter not found: {}", litter_id))),
            Some(_) => Err(Error::Conflict(format!(
                "Litter already awarded: {}",
                litter_id
            ))),
        };
    }

    let litter = sqlx::query_as::<_, Litter>("SELECT * FROM litters WHERE id = ?")
        .bind(litter_id)
        .fetch_one(&mut *tx)
        .await?;

    // Points go to the submitter, not the awarding caller
    sqlx::query("UPDATE profiles SET eco_points = eco_points + ? WHERE id = ?")
        .bind(points)
        .bind(&litter.profile_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(litter)
}

pub async fn plants_by_profile(
    pool: &SqlitePool,
    profile_id: &str,
    page: i64,
) -> Result<(Vec<Plant>, Pagination)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plants WHERE profile_id = ?")
        .bind(profile_id)
        .fetch_one(pool)
        .await?;
    let p = calculate_pagination(total, page);

    let rows = sqlx::query_as::<_, Plant>(
        "SELECT * FROM plants WHERE profile_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(profile_id)
    .bind(PAGE_SIZE)
    .bind(p.offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, p))
}

pub async fn animals_by_profile(
    pool: &SqlitePool,
    profile_id: &str,
    page: i64,
) -> Result<(Vec<Animal>, Pagination)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM animals WHERE profile_id = ?")
        .bind(profile_id)
        .fetch_one(pool)
        .await?;
    let p = calculate_pagination(total, page);

    let rows = sqlx::query_as::<_, Animal>(
        "SELECT * FROM animals WHERE profile_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(profile_id)
    .bind(PAGE_SIZE)
    .bind(p.offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, p))
}

pub async fn litters_by_profile(
    pool: &SqlitePool,
    profile_id: &str,
    page: i64,
) -> Result<(Vec<Litter>, Pagination)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM litters WHERE profile_id = ?")
        .bind(profile_id)
        .fetch_one(pool)
        .await?;
    let p = calculate_pagination(total, page);

    let rows = sqlx::query_as::<_, Litter>(
        "SELECT * FROM litters WHERE profile_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(profile_id)
    .bind(PAGE_SIZE)
    .bind(p.offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, p))
}

/// Litter reports submitted by contributors affiliated with a school
pub async fn litters_by_school(
    pool: &SqlitePool,
    school_id: &str,
    page: i64,
) -> Result<(Vec<Litter>, Pagination)> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM litters l
        JOIN profiles p ON p.id = l.profile_id
        WHERE p.school_id = ?
        "#,
    )
    .bind(school_id)
    .fetch_one(pool)
    .await?;
    let p = calculate_pagination(total, page);

    let rows = sqlx::query_as::<_, Litter>(
        r#"
        SELECT l.* FROM litters l
        JOIN profiles p ON p.id = l.profile_id
        WHERE p.school_id = ?
        ORDER BY l.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(school_id)
    .bind(PAGE_SIZE)
    .bind(p.offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, p))
}

/// Map markers across all observation kinds
pub async fn markers(pool: &SqlitePool) -> Result<Vec<Marker>> {
    let rows = sqlx::query_as::<_, Marker>(
        r#"
        SELECT id, 'plant' AS kind, latitude, longitude, image_url FROM plants
        UNION ALL
        SELECT id, 'animal' AS kind, latitude, longitude, image_url FROM animals
        UNION ALL
        SELECT id, 'litter' AS kind, latitude, longitude, before_image_url AS image_url FROM litters
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
