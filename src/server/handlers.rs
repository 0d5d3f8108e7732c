// src/server/handlers.rs
use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::api::{
    fetch_collection, fetch_page_summaries, fetch_portfolio, Collection, Document, PageSummary,
    Portfolio, TreeFetcher,
};
use crate::constants::{DOCUMENT_CACHE_CONTROL, PORTFOLIO_CACHE_CONTROL};
use crate::error::AppError;
use crate::layout::{group_blocks, split_sections, SectionLayout};
use crate::load::AbortSignal;
use crate::types::NotionId;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub id: Option<String>,
    /// Also return the blocks grouped for display.
    #[serde(default)]
    pub layout: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionQuery {
    pub database_id: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentBody {
    #[serde(flatten)]
    pub document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<SectionLayout>,
}

#[derive(Debug, Serialize)]
pub struct PagesBody {
    pub pages: Vec<PageSummary>,
}

/// A required query parameter, parsed as a Notion id.
fn required_id(value: Option<&str>, name: &str) -> Result<NotionId, AppError> {
    match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(NotionId::parse(raw)?),
        _ => Err(AppError::InvalidRequest(format!("{} is required", name))),
    }
}

/// `GET /document?id=<id>`: a page and its flattened block tree.
pub async fn get_document(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = required_id(query.id.as_deref(), "id")?;
    let repository = state.repository()?;

    // Dropping this future on client disconnect stops further calls, so the
    // request itself never needs to be aborted.
    let fetcher = TreeFetcher::new(repository, state.config.retry, state.config.concurrency);
    let document = fetcher.fetch_document(&id, &AbortSignal::never()).await?;

    let layout = query
        .layout
        .then(|| split_sections(group_blocks(document.blocks.clone())));

    Ok((
        [(header::CACHE_CONTROL, DOCUMENT_CACHE_CONTROL)],
        Json(DocumentBody { document, layout }),
    ))
}

/// `GET /collection?databaseId=<id>[&cursor=<c>]`: one page of a database.
pub async fn get_collection(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
) -> ApiResult<Json<Collection>> {
    let id = required_id(query.database_id.as_deref(), "databaseId")?;
    let repository = state.repository()?;

    let collection =
        fetch_collection(repository.as_ref(), &id, query.cursor, &state.config.retry).await?;
    Ok(Json(collection))
}

/// `GET /portfolio`: works listed in the configured database.
pub async fn get_portfolio(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let configured = state.config.pages.database_id.as_deref().ok_or_else(|| {
        ApiError(AppError::InvalidRequest(
            "No portfolio database is configured".to_string(),
        ))
    })?;
    let id = NotionId::parse(configured).map_err(|e| {
        AppError::MissingConfiguration(format!("Portfolio database id is invalid: {}", e))
    })?;
    let repository = state.repository()?;

    let portfolio: Portfolio =
        fetch_portfolio(repository.as_ref(), &id, &state.config.retry).await?;
    log::info!(
        "Portfolio {} lists {} work(s)",
        portfolio.database.id,
        portfolio.works.len()
    );

    Ok((
        [(header::CACHE_CONTROL, PORTFOLIO_CACHE_CONTROL)],
        Json(portfolio),
    ))
}

/// `GET /pages`: summaries of the configured pages. Pages that fail to load
/// are left out rather than failing the listing.
pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Json<PagesBody>> {
    let repository = state.repository()?;
    let pages = fetch_page_summaries(repository.as_ref(), &state.config.pages.pages).await;
    Ok(Json(PagesBody { pages }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_id_rejects_missing_and_blank() {
        assert!(matches!(
            required_id(None, "id"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            required_id(Some("  "), "id"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            required_id(Some("not-an-id"), "id"),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_required_id_accepts_dashed_and_bare() {
        let bare = required_id(Some("2d974318f7ec8063ab63ecd5a7ecddbe"), "id").unwrap();
        let dashed = required_id(Some("2d974318-f7ec-8063-ab63-ecd5a7ecddbe"), "id").unwrap();
        assert_eq!(bare, dashed);
    }
}
