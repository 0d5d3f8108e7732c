// src/lib.rs
//! notion-site library: serves Notion pages, block trees and databases to a
//! website as JSON.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `TransientFailure`, `ValidationError`
//! - **Configuration**: `SiteConfig`, `PagesConfig`, `CommandLineInput`
//! - **Domain model**: `Page`, `Database`, `Block` and the block payloads
//! - **Domain types**: `NotionId`, `ApiKey`, `BlockId`, `PageId`, etc.
//! - **Fetching**: `NotionRepository`, `TreeFetcher`, the portfolio and batch
//!   operations, `retry_transient`
//! - **Cancellation**: `LoadSlot`, `AbortHandle`, `AbortSignal`
//! - **Layout**: `group_blocks`, `split_sections`
//! - **HTTP surface**: `create_router`, `AppState`

mod api;
mod config;
mod constants;
mod error;
mod error_recovery;
mod layout;
mod load;
mod model;
mod server;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionClientError, NotionErrorCode, TransientFailure};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, PageEntry, PagesConfig, SiteConfig};
pub use crate::constants::{
    DEFAULT_FETCH_CONCURRENCY, DOCUMENT_CACHE_CONTROL, PORTFOLIO_CACHE_CONTROL,
};

// --- Domain Model ---
pub use crate::model::{
    Block, BlockCommon, Database, DatabaseProperty, DatabasePropertyKind, DatabaseTitle, Page,
    PageTitle, Parent, PropertyTypeValue, PropertyValue,
};

// --- Block Types ---
pub use crate::model::blocks::{
    BookmarkBlock, CalloutBlock, ChildBlock, CodeBlock, EquationBlock, ExternalFile, FileObject,
    Icon, LinkToPageBlock, MarkerBlock, MediaBlock, NotionFile, SyncedBlock, TableBlock,
    TableRowBlock, TextBlock, TextBlockContent, ToDoBlock, UnsupportedBlock, UrlBlock,
};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, Color, DatabaseId, DateValue, File, Link, MentionType, NotionId,
    PageId, PropertyName, RichTextItem, RichTextType, SelectOption, User, ValidatedUrl,
};

// --- Fetching ---
pub use crate::api::{
    fetch_all_pages_simple, fetch_collection, fetch_page_summaries, fetch_portfolio,
    lookup_collection,
    parser::{
        parse_api_response, parse_blocks_pagination, parse_database_response,
        parse_page_response, parse_pages_pagination,
    },
    ApiResponse, Collection, Document, NotionHttpClient, NotionRepository, PageSummary,
    PaginatedResponse, PaginationResult, Portfolio, PortfolioDatabase, TreeFetcher, WorkSummary,
    UNTITLED_WORK,
};
pub use crate::error_recovery::{retry_transient, RetryPolicy};

// --- Cancellation ---
pub use crate::load::{AbortHandle, AbortSignal, LoadSlot, LoadState, LoadTicket};

// --- Layout ---
pub use crate::layout::{
    group_blocks, split_sections, LayoutItem, SectionLayout, EXHIBITION_KEYWORDS,
    PROJECT_KEYWORDS,
};

// --- HTTP Surface ---
pub use crate::server::{create_router, ApiError, AppState, ErrorBody};
