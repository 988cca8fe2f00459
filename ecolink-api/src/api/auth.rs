//! Bearer-token authentication middleware
//!
//! Tokens are verified against an external identity service; the verified
//! subject id is attached to the request for handlers to consume. Any
//! verification failure is treated as "unauthenticated" and answered with
//! a 401 and the fixed `{ "error": … }` body.
//!
//! When no verification URL is configured the verifier runs in trusted
//! mode and accepts the bearer token itself as the subject id. This is for
//! local development and the integration tests; startup logs it loudly.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use crate::AppState;

/// Verified caller identity, inserted into request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// External-auth subject id
    pub user_id: String,
}

/// Identity verification client
pub struct AuthVerifier {
    verify_url: Option<String>,
    http: reqwest::Client,
}

impl AuthVerifier {
    pub fn new(verify_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { verify_url, http }
    }

    /// True when running without an external identity service
    pub fn is_trusted_mode(&self) -> bool {
        self.verify_url.is_none()
    }

    /// Resolve a bearer token to a verified subject id
    pub async fn verify(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let Some(verify_url) = &self.verify_url else {
            // Trusted mode: the token is the subject id
            return Ok(token.to_string());
        };

        let response = self
            .http
            .get(verify_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity service unreachable: {}", e);
                AuthError::InvalidToken
            })?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        body.get("id")
            .or_else(|| body.get("sub"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(AuthError::InvalidToken)
    }
}

/// Authentication middleware for protected routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingHeader)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

    let user_id = state.auth.verify(token).await?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

/// Authentication failures, all answered with 401
#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingHeader => "Missing Authorization header",
            AuthError::InvalidToken => "Invalid or expired token",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}
