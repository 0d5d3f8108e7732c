// src/api/mod.rs
//! Notion API interaction: retrieving pages, databases and block trees.
//!
//! HTTP details stay in `client` and `parser`; everything above this module
//! talks to a [`NotionRepository`].

mod batch;
pub mod client;
mod collection;
mod notion_client_adapter;
pub mod parser;
mod responses;
mod simple_pagination;
mod tree_fetcher;
mod types;

use crate::error::AppError;
use crate::model::{Block, Database, Page};
use crate::types::NotionId;

/// The ability to retrieve content from a Notion workspace.
///
/// Listing calls return a single page of results; callers follow
/// `next_cursor` themselves (see [`fetch_all_pages_simple`]).
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError>;
    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError>;
    async fn retrieve_children_page(
        &self,
        parent: &NotionId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Block>, AppError>;
    async fn query_database_page(
        &self,
        database: &NotionId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Page>, AppError>;
}

pub use batch::{fetch_page_summaries, PageSummary};
pub use client::{ApiResponse, NotionHttpClient};
pub use collection::{
    fetch_collection, fetch_portfolio, lookup_collection, Collection, Portfolio,
    PortfolioDatabase, WorkSummary, UNTITLED_WORK,
};
pub use simple_pagination::fetch_all_pages_simple;
pub use tree_fetcher::{Document, TreeFetcher};
pub use types::{PaginatedResponse, PaginationResult};
