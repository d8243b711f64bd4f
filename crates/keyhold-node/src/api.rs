//! HTTP API for the Keyhold node.
//!
//! Two credential endpoints plus health and metrics:
//!
//! - `POST /register` `{"email", "password"}` → `201`
//! - `POST /login` `{"email", "password"}` → `200` or `401`
//! - `GET /health` → `200`
//! - `GET /metrics` → Prometheus text format
//!
//! Every failed login gets the same `401` body regardless of whether the
//! email is unknown, the password is wrong, or the stored record is corrupt.

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use keyhold_credentials::{
    CredentialError, CredentialService, CredentialStore, HasherConfig, MemoryStore, SecretString,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::observability::{
    metrics_handler, metrics_middleware, request_id_middleware, MetricsState,
};

/// Message returned for every failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password";

/// Credential service over a swappable store backend.
pub type SharedCredentials = Arc<CredentialService<Arc<dyn CredentialStore>>>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Enrollment and authentication.
    pub credentials: SharedCredentials,
    /// Prometheus metrics.
    pub metrics: MetricsState,
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl AppState {
    /// State backed by a fresh in-memory store.
    pub fn new(config: HasherConfig) -> Result<Self, CredentialError> {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// State backed by `store`.
    pub fn with_store(
        config: HasherConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            credentials: Arc::new(CredentialService::new(config, store)?),
            metrics: MetricsState::new(),
        })
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing fields or unparseable JSON body.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Hashing a new credential failed.
    #[error("enrollment failed: {0}")]
    Enroll(#[from] CredentialError),
    /// Any failed login. Carries no detail on purpose.
    #[error("authentication failed")]
    Unauthorized,
    /// The blocking hash task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Enroll(CredentialError::EmptySecret) => {
                (StatusCode::BAD_REQUEST, "password must not be empty".to_string())
            }
            ApiError::Enroll(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Enrollment failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error hashing password".to_string(),
                )
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, LOGIN_FAILED_MESSAGE.to_string()),
            ApiError::Join(e) => {
                tracing::error!(error = %e, "Credential worker task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Body of `/register` and `/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    /// Identifier the credential is stored under. Compared byte-exact.
    pub email: String,
    /// Plaintext password, redacted in logs.
    pub password: SecretString,
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Enrolls (or re-enrolls) an email/password pair.
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let credentials = Arc::clone(&state.credentials);

    // Hashing is deliberately slow; keep it off the async workers.
    let result =
        tokio::task::spawn_blocking(move || credentials.enroll(&req.email, req.password.expose()))
            .await?;

    if let Err(e) = result {
        state.metrics.record_enroll_failure(e.kind());
        return Err(e.into());
    }
    state.metrics.record_enrollment();

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered",
        }),
    ))
}

/// Checks an email/password pair.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let credentials = Arc::clone(&state.credentials);

    let outcome =
        tokio::task::spawn_blocking(move || credentials.authenticate(&req.email, req.password.expose()))
            .await?;

    state.metrics.record_auth(outcome.as_str());

    if !outcome.is_authenticated() {
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(MessageResponse {
        message: "Logged in successfully",
    }))
}
