//! NDA comparison API
//!
//! Two endpoints in front of two third-party services:
//!
//! - `POST /api/upload`: forwards a PDF/DOC/DOCX to the document-parse
//!   service and returns its text, HTML and element structure
//! - `POST /api/analyze`: sends both texts to the chat-completion service
//!   under a strict JSON schema and returns the structured comparison,
//!   or a fixed fallback when that fails
//!
//! Nothing is persisted; every request stands alone.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod upstream;
pub mod validation;


pub use config::Args;
pub use error::ApiError;
pub use state::AppState;

/// Build the full router with middleware
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    // CORS configuration for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Document endpoints
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/analyze", post(handlers::analyze))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
