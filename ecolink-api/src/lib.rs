//! ecolink-api library interface
//!
//! Exposes `AppState` and `build_router` for the binary and for
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::AuthVerifier;
use crate::services::{ClassifierClient, StorageClient};

/// Application state shared across handlers
///
/// All external-service clients are constructed once at startup and
/// carried here; there are no process-wide lazily-initialized singletons.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Object storage client
    pub storage: Arc<StorageClient>,
    /// AI classification client
    pub classifier: Arc<ClassifierClient>,
    /// Identity verification client
    pub auth: Arc<AuthVerifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        storage: StorageClient,
        classifier: ClassifierClient,
        auth: AuthVerifier,
    ) -> Self {
        Self {
            db,
            storage: Arc::new(storage),
            classifier: Arc::new(classifier),
            auth: Arc::new(auth),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Protected routes sit behind the bearer-token middleware; leaderboard,
/// markers and health are public.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/user", post(api::users::create_user))
        .route("/user/:user_id", get(api::users::get_user))
        .route("/org/:org_type", post(api::orgs::create_org))
        .route("/org/join/:org_type", post(api::orgs::join_org))
        .route("/ngo/event", post(api::events::create_ngo_event))
        .route("/ngo/event/apply", post(api::events::apply_ngo_event))
        .route("/school/event", post(api::events::create_school_event))
        .route("/school/event/apply", post(api::events::apply_school_event))
        .route(
            "/school/event/applications/:event_id",
            get(api::events::school_event_applications),
        )
        .route("/ngo/events", get(api::events::list_ngo_events))
        .route("/school/events", get(api::events::list_school_events))
        .route("/plants/upload", post(api::observations::upload_plant))
        .route("/litter/upload", post(api::observations::upload_litter))
        .route("/animal/upload", post(api::observations::upload_animal))
        .route(
            "/litters/school/:school_id",
            get(api::observations::litters_by_school),
        )
        .route("/eco-points/add", post(api::points::add_eco_points))
        .route("/plants/student", get(api::observations::plants_by_student))
        .route(
            "/animals/student",
            get(api::observations::animals_by_student),
        )
        .route(
            "/litters/student",
            get(api::observations::litters_by_student),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/leaderboard", get(api::leaderboard::get_leaderboard))
        .route("/markers", get(api::markers::get_markers));

    Router::new()
        .nest("/api/v1", protected.merge(public))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
