//! Contributor profile queries

use chrono::Utc;
use ecolink_common::db::models::{Profile, Role};
use ecolink_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields for a new contributor profile
#[derive(Debug, Clone)]
pub struct NewProfile {
    /// External-auth subject id
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub profile_pic: Option<String>,
}

/// Create a contributor profile; duplicate subject ids are a conflict
pub async fn create(pool: &SqlitePool, new: NewProfile) -> Result<Profile> {
    let id = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, full_name, email, role, profile_pic, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.user_id)
    .bind(&new.full_name)
    .bind(&new.email)
    .bind(new.role.as_str())
    .bind(&new.profile_pic)
    .bind(Utc::now())
    .execute(pool)
    .await;

    match result {
        Ok(_) => get_by_id(pool, &id).await,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(Error::Conflict(
            format!("User already exists: {}", new.user_id),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Fetch a profile by its row id
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Profile> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Profile not found: {}", id)))
}

/// Fetch a profile by the external-auth subject id
pub async fn get_by_user_id(pool: &SqlitePool, user_id: &str) -> Result<Profile> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User not found: {}", user_id)))
}

/// Top contributors: at most 10 students with points, highest first
pub async fn leaderboard(pool: &SqlitePool) -> Result<Vec<Profile>> {
    let rows = sqlx::query_as::<_, Profile>(
        r#"
        SELECT * FROM profiles
        WHERE role = 'STUDENT' AND eco_points > 0
        ORDER BY eco_points DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
