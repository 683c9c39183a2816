//! Libris HTTP surface
//!
//! A small axum application: the public search endpoint and the two
//! get-or-create endpoints used by client-side autofill tooling. All
//! state is built at startup and passed by reference; there is nothing
//! ambient.

pub mod error;
pub mod handlers;

pub use error::ServerError;

use axum::routing::{get, post};
use axum::Router;
use libris_catalog::CatalogManager;
use log::info;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogManager>,
}

impl AppState {
    pub fn new(catalog: CatalogManager) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/authors/get_or_create",
            post(handlers::author_get_or_create),
        )
        .route(
            "/api/publishers/get_or_create",
            post(handlers::publisher_get_or_create),
        )
        .with_state(state)
}

/// Binds and serves until the process is stopped
pub async fn serve(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, router(state)).await
}
