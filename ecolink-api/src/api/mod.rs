//! HTTP API handlers

pub mod auth;
pub mod events;
pub mod health;
pub mod leaderboard;
pub mod markers;
pub mod observations;
pub mod orgs;
pub mod points;
pub mod users;

pub use auth::{auth_middleware, AuthUser, AuthVerifier};
pub use health::health_routes;
