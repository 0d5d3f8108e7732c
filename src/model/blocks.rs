use super::common::BlockCommon;
use crate::types::{plain_text_of, BlockId, Color, PageId, RichTextItem};
use serde::{Deserialize, Serialize};

/// Rich text plus the block-level color.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlockContent {
    pub rich_text: Vec<RichTextItem>,
    #[serde(default)]
    pub color: Color,
}

impl TextBlockContent {
    pub fn plain_text(&self) -> String {
        plain_text_of(&self.rich_text)
    }
}

/// Paragraphs, headings, list items, toggles, quotes and templates all share
/// this shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    #[serde(flatten)]
    pub content: TextBlockContent,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToDoBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    #[serde(flatten)]
    pub content: TextBlockContent,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub icon: Option<Icon>,
    #[serde(flatten)]
    pub content: TextBlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: NotionFile },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub language: String,
    pub caption: Vec<RichTextItem>,
    #[serde(flatten)]
    pub content: TextBlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub expression: String,
}

/// Blocks with no payload of their own: dividers, breadcrumbs, tables of
/// contents and the column layout containers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
}

/// Image, video, file and pdf blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub file: FileObject,
    #[serde(default)]
    pub caption: Vec<RichTextItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub url: String,
    pub caption: Vec<RichTextItem>,
}

/// Embeds and link previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub url: String,
}

/// Child pages and child databases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkToPageBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub page_id: PageId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub table_width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRowBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub cells: Vec<Vec<RichTextItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    /// `None` for the original block, the source block id for a copy.
    pub synced_from: Option<BlockId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub block_type: String,
}

/// A hosted or external file reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    External { external: ExternalFile },
    File { file: NotionFile },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::External { external } => &external.url,
            FileObject::File { file } => &file.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionFile {
    pub url: String,
    pub expiry_time: Option<chrono::DateTime<chrono::Utc>>,
}
