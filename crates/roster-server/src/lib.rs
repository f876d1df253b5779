//! HTTP server for the Roster student directory.
//!
//! Loads [`ServerConfig`], opens the configured backend, and serves the
//! `roster-api` routes under `/api`.

pub mod backend;
pub mod config;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use backend::{Backend, BackendError, Directory, build_directory};
pub use config::{BackendConfig, RemoteBackendConfig, ServerConfig};

/// Build the application router around an opened directory.
pub fn app(directory: Directory) -> Router {
  Router::new()
    .nest("/api", roster_api::api_router(Arc::new(directory)))
    .layer(TraceLayer::new_for_http())
}
