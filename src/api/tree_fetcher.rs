// src/api/tree_fetcher.rs
//! Recursive block-tree fetching with a per-level concurrency cap.
//!
//! The result is flattened level by level: a level's blocks come first, in
//! their original order, followed by the subtree of each children-bearing
//! block in the order of those blocks.

use super::simple_pagination::fetch_all_pages_simple;
use super::NotionRepository;
use crate::error::AppError;
use crate::error_recovery::{retry_transient, RetryPolicy};
use crate::load::AbortSignal;
use crate::model::{Block, Page};
use crate::types::NotionId;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::sync::Arc;

/// A page together with every block below it, flattened.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub document: Page,
    pub blocks: Vec<Block>,
}

/// Fetches block trees through a [`NotionRepository`].
#[derive(Clone)]
pub struct TreeFetcher {
    repository: Arc<dyn NotionRepository>,
    retry: RetryPolicy,
    concurrency: usize,
}

impl TreeFetcher {
    pub fn new(
        repository: Arc<dyn NotionRepository>,
        retry: RetryPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            repository,
            retry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Retrieves a page and the full tree of blocks under it.
    ///
    /// The page and its first level of children are requested together.
    pub async fn fetch_document(
        &self,
        id: &NotionId,
        signal: &AbortSignal,
    ) -> Result<Document, AppError> {
        log::info!("Fetching document {}", id);

        let page = retry_transient(&self.retry, move || async move {
            signal.check()?;
            self.repository.retrieve_page(id).await
        });
        let (document, top_level) = tokio::try_join!(page, self.list_children(id, signal))?;

        let blocks = self.fetch_descendants(top_level, signal).await?;
        log::info!(
            "Fetched document {} ({}): {} blocks",
            id,
            document.title(),
            blocks.len()
        );

        Ok(Document { document, blocks })
    }

    /// Every child of `parent`, following pagination cursors. Each page of
    /// results is one outbound call, retried on transient failures.
    pub async fn list_children(
        &self,
        parent: &NotionId,
        signal: &AbortSignal,
    ) -> Result<Vec<Block>, AppError> {
        let result = fetch_all_pages_simple(
            |_, cursor: Option<String>| {
                retry_transient(&self.retry, move || {
                    let cursor = cursor.clone();
                    async move {
                        signal.check()?;
                        self.repository.retrieve_children_page(parent, cursor).await
                    }
                })
            },
        )
        .await?;

        log::debug!(
            "Listed {} children of {} in {} page(s)",
            result.items.len(),
            parent,
            result.pages_fetched
        );
        Ok(result.items)
    }

    /// Expands `blocks` into the flattened tree below them.
    ///
    /// Blocks without children never cause a call. At one level, at most
    /// `concurrency` child listings are in flight, then at most `concurrency`
    /// of the fetched child lists are expanded at once. Any failure aborts
    /// the whole expansion.
    pub fn fetch_descendants<'a>(
        &'a self,
        blocks: Vec<Block>,
        signal: &'a AbortSignal,
    ) -> BoxFuture<'a, Result<Vec<Block>, AppError>> {
        async move {
            let parents: Vec<NotionId> = blocks
                .iter()
                .filter(|block| block.has_children())
                .map(|block| NotionId::from(block.id()))
                .collect();

            if parents.is_empty() {
                return Ok(blocks);
            }

            log::debug!(
                "Expanding {} of {} blocks (concurrency {})",
                parents.len(),
                blocks.len(),
                self.concurrency
            );

            let child_lists: Vec<Vec<Block>> = stream::iter(parents)
                .map(|parent| async move { self.list_children(&parent, signal).await })
                .buffered(self.concurrency)
                .try_collect()
                .await?;

            let subtrees: Vec<Vec<Block>> = stream::iter(child_lists)
                .map(|children| self.fetch_descendants(children, signal))
                .buffered(self.concurrency)
                .try_collect()
                .await?;

            let mut flattened = blocks;
            flattened.extend(subtrees.into_iter().flatten());
            Ok(flattened)
        }
        .boxed()
    }
}

impl std::fmt::Debug for TreeFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeFetcher")
            .field("retry", &self.retry)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
