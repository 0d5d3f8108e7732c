// tests/common/mod.rs
//! An in-memory Notion workspace for integration tests.
#![allow(dead_code)]

use notion_site::{
    AbortHandle, AppError, Block, BlockCommon, BlockId, ChildBlock, Database, DatabaseTitle,
    NotionClientError, NotionErrorCode, NotionId, NotionRepository, Page, PageId, PageTitle,
    PaginatedResponse, PropertyName, PropertyTypeValue, PropertyValue, RichTextItem, TextBlock,
    TextBlockContent,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A 32-hex id distinguished by `n`.
pub fn hex_id(n: u32) -> String {
    format!("{:032x}", n)
}

pub fn notion_id(n: u32) -> NotionId {
    NotionId::parse(&hex_id(n)).unwrap()
}

pub fn page(n: u32, title: &str) -> Page {
    Page {
        id: PageId::parse(&hex_id(n)).unwrap(),
        title: PageTitle::new(title),
        url: format!("https://www.notion.so/{}", hex_id(n)),
        last_edited_time: None,
        cover: None,
        properties: HashMap::new(),
        parent: None,
        archived: false,
    }
}

pub fn with_property(mut page: Page, name: &str, value: PropertyTypeValue) -> Page {
    page.properties
        .insert(PropertyName::new(name), PropertyValue::new(name, value));
    page
}

pub fn database(n: u32, title: &str) -> Database {
    Database {
        id: notion_site::DatabaseId::parse(&hex_id(n)).unwrap(),
        title: DatabaseTitle::new(vec![RichTextItem::plain_text(title)]),
        url: format!("https://www.notion.so/{}", hex_id(n)),
        properties: HashMap::new(),
        parent: None,
        archived: false,
    }
}

fn common(n: u32, has_children: bool) -> BlockCommon {
    BlockCommon::new(BlockId::parse(&hex_id(n)).unwrap()).with_children(has_children)
}

pub fn paragraph(n: u32, has_children: bool) -> Block {
    Block::Paragraph(TextBlock {
        common: common(n, has_children),
        content: TextBlockContent {
            rich_text: vec![RichTextItem::plain_text(&format!("block {}", n))],
            color: Default::default(),
        },
    })
}

pub fn child_database(n: u32) -> Block {
    Block::ChildDatabase(ChildBlock {
        common: common(n, false),
        title: "Works".to_string(),
    })
}

/// Ids of `blocks`, as their distinguishing number.
pub fn block_numbers(blocks: &[Block]) -> Vec<u32> {
    blocks
        .iter()
        .map(|block| u32::from_str_radix(&block.id().as_str().replace('-', ""), 16).unwrap())
        .collect()
}

/// How a call should fail.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Validation,
    Reset,
    Unauthorized,
}

impl Failure {
    pub fn to_error(self) -> AppError {
        let service = |code: NotionErrorCode, status: reqwest::StatusCode| AppError::NotionService {
            message: format!("fake {}", code),
            code,
            status,
        };
        match self {
            Failure::NotFound => {
                service(NotionErrorCode::ObjectNotFound, reqwest::StatusCode::NOT_FOUND)
            }
            Failure::Validation => {
                service(NotionErrorCode::ValidationFailed, reqwest::StatusCode::BAD_REQUEST)
            }
            Failure::Unauthorized => {
                service(NotionErrorCode::Unauthorized, reqwest::StatusCode::UNAUTHORIZED)
            }
            Failure::Reset => AppError::NotionClient(NotionClientError::Transport {
                message: "socket hang up: read ECONNRESET".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeNotion {
    pages: HashMap<NotionId, Page>,
    databases: HashMap<NotionId, (Database, Vec<Page>)>,
    children: HashMap<NotionId, Vec<Block>>,
    /// Remaining failures per id; `usize::MAX` fails forever.
    failures: Mutex<HashMap<NotionId, (usize, Failure)>>,
    children_page_size: Option<usize>,
    delay: Duration,
    abort_after: Mutex<Option<(usize, AbortHandle)>>,

    page_calls: AtomicUsize,
    database_calls: AtomicUsize,
    children_calls: Mutex<Vec<NotionId>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.insert(NotionId::from(&page.id), page);
        self
    }

    pub fn with_children(mut self, parent: u32, blocks: Vec<Block>) -> Self {
        self.children.insert(notion_id(parent), blocks);
        self
    }

    pub fn with_database(mut self, database: Database, rows: Vec<Page>) -> Self {
        self.databases
            .insert(NotionId::from(&database.id), (database, rows));
        self
    }

    /// Every call touching `id` fails `times` times, then succeeds.
    pub fn failing(self, id: u32, times: usize, failure: Failure) -> Self {
        self.failures.lock().insert(notion_id(id), (times, failure));
        self
    }

    pub fn always_failing(self, id: u32, failure: Failure) -> Self {
        self.failing(id, usize::MAX, failure)
    }

    /// Children listings return at most `size` blocks per page.
    pub fn paged(mut self, size: usize) -> Self {
        self.children_page_size = Some(size);
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Raises `handle` while answering the `n`th children listing.
    pub fn abort_after(self, n: usize, handle: AbortHandle) -> Self {
        *self.abort_after.lock() = Some((n, handle));
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn database_calls(&self) -> usize {
        self.database_calls.load(Ordering::SeqCst)
    }

    pub fn children_calls(&self) -> Vec<NotionId> {
        self.children_calls.lock().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn take_failure(&self, id: &NotionId) -> Result<(), AppError> {
        let mut failures = self.failures.lock();
        match failures.get_mut(id) {
            Some((remaining, failure)) if *remaining > 0 => {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                Err(failure.to_error())
            }
            _ => Ok(()),
        }
    }

    async fn call(&self, id: &NotionId) -> Result<(), AppError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.take_failure(id)
    }

    fn not_found(id: &NotionId) -> AppError {
        AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: format!("Could not find object with ID: {}", id.to_hyphenated()),
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeNotion {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.call(id).await?;
        self.pages.get(id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError> {
        self.database_calls.fetch_add(1, Ordering::SeqCst);
        self.call(id).await?;
        self.databases
            .get(id)
            .map(|(database, _)| database.clone())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn retrieve_children_page(
        &self,
        parent: &NotionId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        let count = {
            let mut calls = self.children_calls.lock();
            calls.push(parent.clone());
            calls.len()
        };
        if let Some((n, handle)) = self.abort_after.lock().as_ref() {
            if count >= *n {
                handle.abort();
            }
        }
        self.call(parent).await?;

        let all = self.children.get(parent).cloned().unwrap_or_default();
        let Some(size) = self.children_page_size else {
            return Ok(PaginatedResponse::complete(all));
        };

        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + size).min(all.len());
        let has_more = end < all.len();
        Ok(PaginatedResponse {
            object: "list".to_string(),
            results: all[start..end].to_vec(),
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    async fn query_database_page(
        &self,
        database: &NotionId,
        _cursor: Option<String>,
    ) -> Result<PaginatedResponse<Page>, AppError> {
        self.call(database).await?;
        self.databases
            .get(database)
            .map(|(_, rows)| PaginatedResponse::complete(rows.clone()))
            .ok_or_else(|| Self::not_found(database))
    }
}
