//! Error types for ecolink-api
//!
//! Two channels, kept deliberately distinct:
//! - expected business-rule failures (`BadRequest`, `NotFound`, conflicts
//!   from the data layer) surface as 4xx with `{ "message": … }`
//! - unexpected/infrastructure failures surface as a generic 500 with no
//!   detail leaked to the client; detail goes to server-side logging only

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Authentication failure (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// ecolink-common error (data-access layer)
    #[error(transparent)]
    Common(#[from] ecolink_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ecolink_common::Error as CommonError;

        let (status, message) = match self {
            // The 401 body keeps the identity layer's `{ "error": … }`
            // shape; everything else uses `{ "message": … }`
            ApiError::Unauthorized(msg) => {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg })))
                    .into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Common(err) => match err {
                CommonError::NotFound(msg)
                | CommonError::InvalidInput(msg)
                | CommonError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
                other => {
                    error!("Internal error: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            ApiError::Other(err) => {
                error!("Unhandled error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
