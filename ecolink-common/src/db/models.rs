//! Database row models
//!
//! Row structs are also the API response payloads: they serialize with
//! camelCase keys, matching the JSON contract of the mobile/web clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Contributor role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    SchoolStaff,
    NgoStaff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::SchoolStaff => "SCHOOL_STAFF",
            Role::NgoStaff => "NGO_STAFF",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "SCHOOL_STAFF" => Ok(Role::SchoolStaff),
            "NGO_STAFF" => Ok(Role::NgoStaff),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

/// Organization kind, parsed from the `:orgType` path segment
///
/// A closed variant: unvalidated type strings never reach the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgType {
    School,
    Ngo,
}

impl OrgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgType::School => "School",
            OrgType::Ngo => "NGO",
        }
    }
}

impl std::str::FromStr for OrgType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "School" => Ok(OrgType::School),
            "NGO" => Ok(OrgType::Ngo),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown organization type: {}",
                other
            ))),
        }
    }
}

/// Contributor profile, keyed by an externally verified identity
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    /// External-auth subject id (unique)
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub profile_pic: Option<String>,
    pub school_id: Option<String>,
    pub ngo_id: Option<String>,
    pub eco_points: i64,
    pub created_at: DateTime<Utc>,
}

/// School or NGO organization row
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub phone_no: String,
    pub email: String,
    /// Public invitation token
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Plant sighting
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    /// Rarity tier in 1..=5
    pub rarity: i64,
    pub description: String,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
}

/// Litter report with before/after photo evidence
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Litter {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub before_image_url: String,
    pub after_image_url: String,
    /// Set once points have been granted; guards against double-award
    pub is_awarded: bool,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
}

/// Animal sighting
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub rarity: i64,
    pub description: String,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
}

/// NGO event
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ngo_id: String,
    pub created_at: DateTime<Utc>,
}

/// School event
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    pub school_id: String,
    pub created_at: DateTime<Utc>,
}

/// Application to an NGO event (has an approval status)
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoEventApplication {
    pub id: String,
    pub event_id: String,
    pub profile_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Application to a school event
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolEventApplication {
    pub id: String,
    pub event_id: String,
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
}
