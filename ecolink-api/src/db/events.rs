//! Event and application queries

use crate::pagination::{calculate_pagination, Pagination, PAGE_SIZE};
use chrono::Utc;
use ecolink_common::db::models::{
    NgoEvent, NgoEventApplication, SchoolEvent, SchoolEventApplication,
};
use ecolink_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields for a new event (either variant)
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Owning organization id
    pub org_id: String,
}

pub async fn create_ngo_event(pool: &SqlitePool, new: &NewEvent) -> Result<NgoEvent> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM ngos WHERE id = ?")
        .bind(&new.org_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!("NGO not found: {}", new.org_id)));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO ngo_events (id, title, description, date, latitude, longitude, ngo_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.date)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.org_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, NgoEvent>("SELECT * FROM ngo_events WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}

pub async fn create_school_event(pool: &SqlitePool, new: &NewEvent) -> Result<SchoolEvent> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM schools WHERE id = ?")
        .bind(&new.org_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!("School not found: {}", new.org_id)));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO school_events (id, title, description, date, latitude, longitude, school_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.date)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.org_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, SchoolEvent>("SELECT * FROM school_events WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}

/// Apply to an NGO event; applications start in PENDING
pub async fn apply_ngo_event(
    pool: &SqlitePool,
    event_id: &str,
    profile_id: &str,
) -> Result<NgoEventApplication> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM ngo_events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!("Event not found: {}", event_id)));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO ngo_event_applications (id, event_id, profile_id, status, created_at)
        VALUES (?, ?, ?, 'PENDING', ?)
        "#,
    )
    .bind(&id)
    .bind(event_id)
    .bind(profile_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, NgoEventApplication>("SELECT * FROM ngo_event_applications WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}

pub async fn apply_school_event(
    pool: &SqlitePool,
    event_id: &str,
    profile_id: &str,
) -> Result<SchoolEventApplication> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM school_events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(Error::NotFound(format!("Event not found: {}", event_id)));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO school_event_applications (id, event_id, profile_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(event_id)
    .bind(profile_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, SchoolEventApplication>(
        "SELECT * FROM school_event_applications WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// All applications for one school event
pub async fn applications_for_school_event(
    pool: &SqlitePool,
    event_id: &str,
) -> Result<Vec<SchoolEventApplication>> {
    let rows = sqlx::query_as::<_, SchoolEventApplication>(
        "SELECT * FROM school_event_applications WHERE event_id = ? ORDER BY created_at DESC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_ngo_events(
    pool: &SqlitePool,
    page: i64,
) -> Result<(Vec<NgoEvent>, Pagination)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ngo_events")
        .fetch_one(pool)
        .await?;
    let p = calculate_pagination(total, page);

    let rows = sqlx::query_as::<_, NgoEvent>(
        "SELECT * FROM ngo_events ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(PAGE_SIZE)
    .bind(p.offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, p))
}

pub async fn list_school_events(
    pool: &SqlitePool,
    page: i64,
    school_id: Option<&str>,
) -> Result<(Vec<SchoolEvent>, Pagination)> {
    if let Some(school_id) = school_id {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM school_events WHERE school_id = ?")
                .bind(school_id)
                .fetch_one(pool)
                .await?;
        let p = calculate_pagination(total, page);
        let rows = sqlx::query_as::<_, SchoolEvent>(
            "SELECT * FROM school_events WHERE school_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(school_id)
        .bind(PAGE_SIZE)
        .bind(p.offset)
        .fetch_all(pool)
        .await?;
        return Ok((rows, p));
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM school_events")
        .fetch_one(pool)
        .await?;
    let p = calculate_pagination(total, page);
    let rows = sqlx::query_as::<_, SchoolEvent>(
        "SELECT * FROM school_events ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(PAGE_SIZE)
    .bind(p.offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, p))
}
