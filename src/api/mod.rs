//! API handlers.

pub mod bookmarks;
pub mod database;
pub mod settings;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::DatabaseConfig;
use crate::error::MarkError;

/// Largest accepted database upload.
pub const MAX_IMPORT_BYTES: usize = 64 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub database: DatabaseConfig,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Body returned by endpoints that have nothing else to report.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        ApiError::Internal("Database error".to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("IO error: {:?}", err);
        ApiError::Internal("IO error".to_string())
    }
}

impl From<MarkError> for ApiError {
    fn from(err: MarkError) -> Self {
        match err {
            MarkError::Validation(m) => ApiError::BadRequest(m),
            MarkError::NotFound(m) => ApiError::NotFound(m),
            MarkError::Conflict(m) => ApiError::Conflict(m),
            MarkError::Forbidden(m) => ApiError::Forbidden(m),
            MarkError::Database(e) => e.into(),
            other => {
                tracing::error!("Internal error: {}", other);
                ApiError::Internal("Internal error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Bookmarks
        .route(
            "/api/bookmarks",
            get(bookmarks::list).post(bookmarks::create),
        )
        .route(
            "/api/bookmarks/:id",
            post(bookmarks::open)
                .patch(bookmarks::update)
                .delete(bookmarks::delete),
        )
        // Settings
        .route(
            "/api/settings",
            get(settings::get).patch(settings::update),
        )
        .route("/api/config", get(settings::config))
        // Database transfer
        .route("/api/database/export", get(database::export))
        .route(
            "/api/database/import",
            post(database::import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
