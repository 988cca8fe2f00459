//! Organization queries
//!
//! Creating an organization and pointing the creator's profile at it happen
//! in one transaction: both writes succeed or both roll back. Join-code
//! collisions roll the transaction back and retry with a fresh code.

use chrono::Utc;
use ecolink_common::db::models::{Organization, OrgType, Profile};
use ecolink_common::{join_code, Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Bounded retries for join-code collisions
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Fields for a new organization
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub phone_no: String,
    pub email: String,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Create an organization with a fresh join code and affiliate the creator
pub async fn create_with_creator(
    pool: &SqlitePool,
    org_type: OrgType,
    new: &NewOrganization,
    user_id: &str,
) -> Result<(Organization, Profile)> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let id = Uuid::new_v4().to_string();
        let code = join_code::generate();
        let mut tx = pool.begin().await?;

        let insert = match org_type {
            OrgType::School => {
                sqlx::query(
                    r#"
                    INSERT INTO schools (id, name, phone_no, email, code, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
            }
            OrgType::Ngo => {
                sqlx::query(
                    r#"
                    INSERT INTO ngos (id, name, phone_no, email, code, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
            }
        }
        .bind(&id)
        .bind(&new.name)
        .bind(&new.phone_no)
        .bind(&new.email)
        .bind(&code)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            tx.rollback().await?;
            if is_unique_violation(&e) {
                warn!(attempt, "Join code collision, regenerating");
                continue;
            }
            return Err(e.into());
        }

        // Last-write-wins: creating another organization overwrites the
        // creator's previous affiliation of the same type
        let update = match org_type {
            OrgType::School => {
                sqlx::query("UPDATE profiles SET school_id = ? WHERE user_id = ?")
            }
            OrgType::Ngo => sqlx::query("UPDATE profiles SET ngo_id = ? WHERE user_id = ?"),
        }
        .bind(&id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if update.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(Error::NotFound(format!("User not found: {}", user_id)));
        }

        let org = fetch_org(&mut tx, org_type, &id).await?;
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            org_type = org_type.as_str(),
            org_id = %org.id,
            code = %org.code,
            "Organization created"
        );

        return Ok((org, profile));
    }

    Err(Error::Internal(format!(
        "Failed to allocate a unique join code after {} attempts",
        MAX_CODE_ATTEMPTS
    )))
}

async fn fetch_org(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    org_type: OrgType,
    id: &str,
) -> Result<Organization> {
    let org = match org_type {
        OrgType::School => {
            sqlx::query_as::<_, Organization>("SELECT * FROM schools WHERE id = ?")
        }
        OrgType::Ngo => sqlx::query_as::<_, Organization>("SELECT * FROM ngos WHERE id = ?"),
    }
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(org)
}

/// Look up an organization by join code and affiliate the contributor
///
/// An unknown code fails with NotFound and leaves the profile untouched.
pub async fn join_by_code(
    pool: &SqlitePool,
    org_type: OrgType,
    code: &str,
    user_id: &str,
) -> Result<Profile> {
    let org = match org_type {
        OrgType::School => {
            sqlx::query_as::<_, Organization>("SELECT * FROM schools WHERE code = ?")
        }
        OrgType::Ngo => sqlx::query_as::<_, Organization>("SELECT * FROM ngos WHERE code = ?"),
    }
    .bind(code)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Organization not found for code: {}", code)))?;

    let update = match org_type {
        OrgType::School => sqlx::query("UPDATE profiles SET school_id = ? WHERE user_id = ?"),
        OrgType::Ngo => sqlx::query("UPDATE profiles SET ngo_id = ? WHERE user_id = ?"),
    }
    .bind(&org.id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if update.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User not found: {}", user_id)));
    }

    info!(
        org_type = org_type.as_str(),
        org_id = %org.id,
        user_id = %user_id,
        "Contributor joined organization"
    );

    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}
