// src/api/batch.rs
//! Summaries of the site's configured pages.

use super::NotionRepository;
use crate::config::PageEntry;
use crate::constants::DOCUMENT_PATH_PREFIX;
use crate::error::AppError;
use crate::types::NotionId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A configured page as listed on the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub last_edited: Option<DateTime<Utc>>,
}

/// Fetches every entry at once, with no concurrency cap.
///
/// Entries that fail to load are logged and left out; the rest keep their
/// configured order. An empty result can mean either that nothing is
/// configured or that every fetch failed.
pub async fn fetch_page_summaries(
    repository: &dyn NotionRepository,
    entries: &[PageEntry],
) -> Vec<PageSummary> {
    let results =
        futures::future::join_all(entries.iter().map(|entry| fetch_summary(repository, entry)))
            .await;

    entries
        .iter()
        .zip(results)
        .filter_map(|(entry, result)| match result {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::warn!("Dropping page {} from the listing: {}", entry.id, e);
                None
            }
        })
        .collect()
}

async fn fetch_summary(
    repository: &dyn NotionRepository,
    entry: &PageEntry,
) -> Result<PageSummary, AppError> {
    let id = NotionId::parse(&entry.id)?;
    let page = repository.retrieve_page(&id).await?;

    let title = if page.title().is_untitled() {
        entry.title.clone()
    } else {
        page.title().to_string()
    };

    Ok(PageSummary {
        id: entry.id.clone(),
        title,
        description: entry.description.clone(),
        url: format!("{}{}", DOCUMENT_PATH_PREFIX, entry.id),
        last_edited: page.last_edited_time,
    })
}
