// src/server/mod.rs
//! The site's JSON API.
//!
//! Every route reads from Notion through the shared [`NotionRepository`];
//! nothing is cached in process. Shared caches are steered with
//! `Cache-Control` on the two routes whose content changes slowly.

mod error;
mod handlers;

pub use error::{ApiError, ErrorBody};

use crate::api::NotionRepository;
use crate::config::SiteConfig;
use crate::error::AppError;
use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    /// `None` when no integration token is configured.
    pub repository: Option<Arc<dyn NotionRepository>>,
}

impl AppState {
    pub fn new(config: SiteConfig, repository: Option<Arc<dyn NotionRepository>>) -> Self {
        Self {
            config: Arc::new(config),
            repository,
        }
    }

    /// The repository, or a configuration error when there is none.
    pub fn repository(&self) -> Result<Arc<dyn NotionRepository>, AppError> {
        self.repository.clone().ok_or_else(|| {
            AppError::MissingConfiguration(
                "NOTION_API_TOKEN is not set; Notion content is unavailable".to_string(),
            )
        })
    }
}

/// Builds the router with all routes and the site-wide response headers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/document", get(handlers::get_document))
        .route("/collection", get(handlers::get_collection))
        .route("/portfolio", get(handlers::get_portfolio))
        .route("/pages", get(handlers::list_pages))
        .route("/health", get(health_check))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("on"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
