//! EcoLink backend API - Main entry point
//!
//! Users join organizations (schools or NGOs), log plant/litter/animal
//! sightings with photo evidence, earn points, and view leaderboards and
//! map markers.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecolink_api::api::AuthVerifier;
use ecolink_api::services::{ClassifierClient, ClassifierConfig, StorageClient, StorageConfig};
use ecolink_api::{build_router, AppState};

/// Command-line arguments for ecolink-api
#[derive(Parser, Debug)]
#[command(name = "ecolink-api")]
#[command(about = "EcoLink backend API service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "ECOLINK_PORT")]
    port: u16,

    /// SQLite database path
    #[arg(long, env = "ECOLINK_DB")]
    database: Option<String>,

    /// S3-compatible storage endpoint URL
    #[arg(long, env = "STORAGE_ENDPOINT")]
    storage_endpoint: String,

    /// Storage bucket name
    #[arg(long, default_value = "ecolink", env = "S3_BUCKET_NAME")]
    storage_bucket: String,

    /// Base URL for public object access (defaults to endpoint/bucket)
    #[arg(long, env = "PUBLIC_STORAGE_URL")]
    storage_public_url: Option<String>,

    /// Bearer credential for the storage service
    #[arg(long, env = "S3_BUCKET_ACCESS_KEY")]
    storage_access_key: Option<String>,

    /// AI classification endpoint URL; omit to disable classification
    #[arg(long, env = "CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Bearer credential for the classification endpoint
    #[arg(long, env = "CLASSIFIER_API_KEY")]
    classifier_api_key: Option<String>,

    /// Classifier call timeout in seconds
    #[arg(long, default_value = "20", env = "CLASSIFIER_TIMEOUT_SECS")]
    classifier_timeout_secs: u64,

    /// Identity verification URL; omit to trust bearer tokens as subject ids
    #[arg(long, env = "AUTH_VERIFY_URL")]
    auth_verify_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecolink_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting EcoLink API on port {}", args.port);

    let db_path =
        ecolink_common::config::resolve_database_path(args.database.as_deref(), "ECOLINK_DB")
            .context("Failed to resolve database path")?;
    let db = ecolink_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let storage = StorageClient::new(StorageConfig {
        endpoint: args.storage_endpoint,
        bucket: args.storage_bucket,
        public_base_url: args.storage_public_url,
        access_key: args.storage_access_key,
    })
    .context("Failed to create storage client")?;

    if args.classifier_url.is_none() {
        warn!("No classifier endpoint configured; observations get the default classification");
    }
    let classifier = ClassifierClient::new(ClassifierConfig {
        endpoint: args.classifier_url,
        api_key: args.classifier_api_key,
        timeout: Duration::from_secs(args.classifier_timeout_secs),
    });

    let auth = AuthVerifier::new(args.auth_verify_url);
    if auth.is_trusted_mode() {
        warn!("No identity service configured; bearer tokens are trusted as subject ids");
    }

    let state = AppState::new(db, storage, classifier, auth);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
