// src/constants.rs
//! Domain constants that define the operational boundaries of the service.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results (its maximum).
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// The API version every request is pinned to.
pub const NOTION_VERSION: &str = "2022-06-28";

pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

// ---------------------------------------------------------------------------
// Fetch policy
// ---------------------------------------------------------------------------

/// Child-listing calls allowed in flight at one level of the block tree.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

/// Total attempts for an outbound call that keeps failing transiently.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;

/// Base delay between attempts; attempt `n` waits `n` times this long.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(DEFAULT_RETRY_DELAY_MS);

/// Upper bound on a single Notion request, connect to last body byte.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// HTTP surface
// ---------------------------------------------------------------------------

/// Shared-cache freshness for a single document.
pub const DOCUMENT_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=120";

/// Shared-cache freshness for the portfolio listing.
pub const PORTFOLIO_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

/// Prefix of the site's own document URLs, followed by the page id.
pub const DOCUMENT_PATH_PREFIX: &str = "/doc/";

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
