//! # stockroom-api: REST Server for Stockroom
//!
//! JSON over HTTP for the Stockroom web client.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Lifecycle                               │
//! │                                                                         │
//! │  Browser ──► CorsLayer ──► log_requests ──► /api router ──► handler    │
//! │                                                              │          │
//! │                                           ┌──────────────────┘          │
//! │                                           ▼                             │
//! │                              state.db.<repository>().<op>()             │
//! │                                           │                             │
//! │                                           ▼                             │
//! │                            Json(T)  or  ApiError {code, message}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use stockroom_db::Database;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::AppConfig;

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .nest("/api", routes::router())
        .fallback(routes::not_found)
        .layer(middleware::from_fn(logging::log_requests));

    let router = match cors_layer(&state.config.allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
