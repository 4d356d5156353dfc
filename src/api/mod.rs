mod error;
mod handlers;

pub use error::{ApiError, ErrorResponse, RowErrorDetail, INVALID_INPUT};
pub use handlers::{CalculateForm, CalculationResponse, UploadResponse, UploadRow};

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::storage::Storage;

/// Shared, read-only state of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let storage = Storage::new(config.upload_dir.clone());
        Self {
            config: Arc::new(config),
            storage,
        }
    }
}

pub fn create_router(config: AppConfig) -> Router {
    let state = AppState::new(config);
    let body_limit = state.config.max_upload_bytes;

    let api = Router::new()
        // Single tree
        .route("/calculate", post(handlers::calculate))
        // Batch
        .route("/upload", post(handlers::upload))
        .route("/download/{filename}", get(handlers::download))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
