// src/api/responses.rs
//! Wire types for Notion API responses.
//!
//! Objects are deserialized with notion-client's types and converted to the
//! domain model through [`ToDomain`].

use crate::error::AppError;
use crate::model::FileObject;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

pub use notion_client::objects::{
    block::Block as NotionBlock, database::Database as NotionDatabase, error::Error as NotionError,
    page::Page as NotionPage,
};

/// Trait for converting notion-client types to domain types
pub trait ToDomain<T> {
    fn to_domain(self) -> Result<T, AppError>;
}

impl ToDomain<crate::model::Database> for NotionDatabase {
    fn to_domain(self) -> Result<crate::model::Database, AppError> {
        super::notion_client_adapter::convert_database(self)
    }
}

impl ToDomain<crate::model::Block> for NotionBlock {
    fn to_domain(self) -> Result<crate::model::Block, AppError> {
        super::notion_client_adapter::convert_block(self)
    }
}

/// The page fields read straight from the response body: when the page was
/// last edited, its cover image and the date properties as written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover: Option<FileObject>,
    #[serde(default)]
    pub properties: HashMap<String, RawProperty>,
}

/// Only the `date` member of a property is read; notion-client normalises
/// datetimes to UTC and would shift the calendar day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProperty {
    #[serde(default)]
    pub date: Option<RawDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDate {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// The fields every block carries, whatever its type.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub archived: bool,
}

impl PageMeta {
    pub fn raw_date(&self, property: &str) -> Option<&RawDate> {
        self.properties
            .get(property)
            .and_then(|p| p.date.as_ref())
            .filter(|date| date.start.is_some())
    }
}

impl ToDomain<crate::model::Page> for (NotionPage, PageMeta) {
    fn to_domain(self) -> Result<crate::model::Page, AppError> {
        let (page, meta) = self;
        super::notion_client_adapter::convert_page(page, meta)
    }
}
