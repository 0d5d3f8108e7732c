// src/api/types.rs
//! Type definitions shared by the Notion API module.

use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated Notion listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default = "list_object")]
    pub object: String,
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

fn list_object() -> String {
    "list".to_string()
}

impl<T> PaginatedResponse<T> {
    /// A single, final page.
    pub fn complete(results: Vec<T>) -> Self {
        Self {
            object: list_object(),
            results,
            next_cursor: None,
            has_more: false,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            object: self.object,
            results: self.results.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        }
    }
}

/// Every item of a listing, gathered by following its cursors.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}
