mod block;
pub mod blocks;
pub mod common;
mod property_value;

pub use block::Block;
pub use blocks::*;
pub use common::*;
pub use property_value::{PropertyTypeValue, PropertyValue};

use crate::types::{BlockId, DatabaseId, PageId, PropertyName, RichTextItem, SelectOption};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Notion page, also used for database rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: PageTitle,
    pub url: String,
    pub last_edited_time: Option<DateTime<Utc>>,
    pub cover: Option<FileObject>,
    pub properties: HashMap<PropertyName, PropertyValue>,
    pub parent: Option<Parent>,
    pub archived: bool,
}

impl Page {
    pub fn title(&self) -> &PageTitle {
        &self.title
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// The first of `names` present on the page, in the given order.
    pub fn first_property<'a>(&'a self, names: &[&str]) -> Option<&'a PropertyValue> {
        names.iter().find_map(|name| self.property(name))
    }
}

/// A Notion database (collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    pub title: DatabaseTitle,
    pub url: String,
    pub properties: HashMap<PropertyName, DatabaseProperty>,
    pub parent: Option<Parent>,
    pub archived: bool,
}

impl Database {
    pub fn title(&self) -> &DatabaseTitle {
        &self.title
    }
}

/// Parent reference with typed IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
    #[serde(rename = "block_id")]
    Block { block_id: BlockId },
    Workspace,
}

/// Plain-text page title; "Untitled" when the page has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageTitle(String);

impl PageTitle {
    pub const UNTITLED: &'static str = "Untitled";

    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_untitled(&self) -> bool {
        self.0.is_empty() || self.0 == Self::UNTITLED
    }
}

impl std::fmt::Display for PageTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseTitle(Vec<RichTextItem>);

impl DatabaseTitle {
    pub fn new(items: Vec<RichTextItem>) -> Self {
        Self(items)
    }

    pub fn as_plain_text(&self) -> String {
        crate::types::plain_text_of(&self.0)
    }

    pub fn items(&self) -> &[RichTextItem] {
        &self.0
    }
}

impl std::fmt::Display for DatabaseTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_plain_text())
    }
}

/// Schema entry of a database column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseProperty {
    pub name: PropertyName,
    #[serde(flatten)]
    pub kind: DatabasePropertyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatabasePropertyKind {
    Title,
    RichText,
    Number,
    Select { options: Vec<SelectOption> },
    MultiSelect { options: Vec<SelectOption> },
    Status { options: Vec<SelectOption> },
    Date,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Files,
    Relation,
    Formula,
    Rollup,
    CreatedTime,
    LastEditedTime,
    Other,
}
