use super::blocks::*;
use super::common::BlockCommon;
use crate::types::BlockId;
use serde::{Deserialize, Serialize};

/// Macro to reduce boilerplate in Block enum methods
macro_rules! match_all_blocks {
    ($self:expr, $pattern:pat => $result:expr) => {
        match $self {
            Block::Paragraph($pattern) => $result,
            Block::Heading1($pattern) => $result,
            Block::Heading2($pattern) => $result,
            Block::Heading3($pattern) => $result,
            Block::BulletedListItem($pattern) => $result,
            Block::NumberedListItem($pattern) => $result,
            Block::ToDo($pattern) => $result,
            Block::Toggle($pattern) => $result,
            Block::Quote($pattern) => $result,
            Block::Callout($pattern) => $result,
            Block::Code($pattern) => $result,
            Block::Equation($pattern) => $result,
            Block::Divider($pattern) => $result,
            Block::Breadcrumb($pattern) => $result,
            Block::TableOfContents($pattern) => $result,
            Block::Image($pattern) => $result,
            Block::Video($pattern) => $result,
            Block::File($pattern) => $result,
            Block::Pdf($pattern) => $result,
            Block::Bookmark($pattern) => $result,
            Block::Embed($pattern) => $result,
            Block::LinkPreview($pattern) => $result,
            Block::ChildPage($pattern) => $result,
            Block::ChildDatabase($pattern) => $result,
            Block::LinkToPage($pattern) => $result,
            Block::Table($pattern) => $result,
            Block::TableRow($pattern) => $result,
            Block::ColumnList($pattern) => $result,
            Block::Column($pattern) => $result,
            Block::SyncedBlock($pattern) => $result,
            Block::Template($pattern) => $result,
            Block::Unsupported($pattern) => $result,
        }
    };
}

/// One content node of a Notion page, tagged by its `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(TextBlock),
    #[serde(rename = "heading_1")]
    Heading1(TextBlock),
    #[serde(rename = "heading_2")]
    Heading2(TextBlock),
    #[serde(rename = "heading_3")]
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Toggle(TextBlock),
    Quote(TextBlock),
    Callout(CalloutBlock),
    Code(CodeBlock),
    Equation(EquationBlock),
    Divider(MarkerBlock),
    Breadcrumb(MarkerBlock),
    TableOfContents(MarkerBlock),
    Image(MediaBlock),
    Video(MediaBlock),
    File(MediaBlock),
    Pdf(MediaBlock),
    Bookmark(BookmarkBlock),
    Embed(UrlBlock),
    LinkPreview(UrlBlock),
    ChildPage(ChildBlock),
    ChildDatabase(ChildBlock),
    LinkToPage(LinkToPageBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    ColumnList(MarkerBlock),
    Column(MarkerBlock),
    SyncedBlock(SyncedBlock),
    Template(TextBlock),
    Unsupported(UnsupportedBlock),
}

impl Block {
    pub fn id(&self) -> &BlockId {
        &self.common().id
    }

    /// Whether the children must be fetched with a separate call.
    pub fn has_children(&self) -> bool {
        self.common().has_children
    }

    pub fn common(&self) -> &BlockCommon {
        match_all_blocks!(self, b => &b.common)
    }

    /// Get block type name
    pub fn block_type(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading1(_) => "heading_1",
            Block::Heading2(_) => "heading_2",
            Block::Heading3(_) => "heading_3",
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::ToDo(_) => "to_do",
            Block::Toggle(_) => "toggle",
            Block::Quote(_) => "quote",
            Block::Callout(_) => "callout",
            Block::Code(_) => "code",
            Block::Equation(_) => "equation",
            Block::Divider(_) => "divider",
            Block::Breadcrumb(_) => "breadcrumb",
            Block::TableOfContents(_) => "table_of_contents",
            Block::Image(_) => "image",
            Block::Video(_) => "video",
            Block::File(_) => "file",
            Block::Pdf(_) => "pdf",
            Block::Bookmark(_) => "bookmark",
            Block::Embed(_) => "embed",
            Block::LinkPreview(_) => "link_preview",
            Block::ChildPage(_) => "child_page",
            Block::ChildDatabase(_) => "child_database",
            Block::LinkToPage(_) => "link_to_page",
            Block::Table(_) => "table",
            Block::TableRow(_) => "table_row",
            Block::ColumnList(_) => "column_list",
            Block::Column(_) => "column",
            Block::SyncedBlock(_) => "synced_block",
            Block::Template(_) => "template",
            Block::Unsupported(b) => &b.block_type,
        }
    }

    /// Heading level (1-3) and its text, for heading blocks only.
    pub fn heading(&self) -> Option<(u8, &TextBlockContent)> {
        match self {
            Block::Heading1(b) => Some((1, &b.content)),
            Block::Heading2(b) => Some((2, &b.content)),
            Block::Heading3(b) => Some((3, &b.content)),
            _ => None,
        }
    }

    /// Text content for the block kinds that carry rich text.
    pub fn text(&self) -> Option<&TextBlockContent> {
        match self {
            Block::Paragraph(b)
            | Block::Heading1(b)
            | Block::Heading2(b)
            | Block::Heading3(b)
            | Block::BulletedListItem(b)
            | Block::NumberedListItem(b)
            | Block::Toggle(b)
            | Block::Quote(b)
            | Block::Template(b) => Some(&b.content),
            Block::ToDo(b) => Some(&b.content),
            Block::Callout(b) => Some(&b.content),
            Block::Code(b) => Some(&b.content),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RichTextItem;

    fn heading_2(text: &str) -> Block {
        Block::Heading2(TextBlock {
            common: BlockCommon::default(),
            content: TextBlockContent {
                rich_text: vec![RichTextItem::plain_text(text)],
                ..Default::default()
            },
        })
    }

    #[test]
    fn test_block_serializes_with_notion_type_tag() {
        let json = serde_json::to_value(heading_2("Awards")).unwrap();
        assert_eq!(json["type"], "heading_2");
        assert_eq!(json["has_children"], false);
        assert_eq!(json["rich_text"][0]["plain_text"], "Awards");
    }

    #[test]
    fn test_heading_exposes_level_and_text() {
        let block = heading_2("项目经历");
        let (level, content) = block.heading().unwrap();
        assert_eq!(level, 2);
        assert_eq!(content.plain_text(), "项目经历");
        assert_eq!(block.block_type(), "heading_2");
    }

    #[test]
    fn test_divider_has_no_text() {
        let block = Block::Divider(MarkerBlock::default());
        assert!(block.text().is_none());
        assert!(block.heading().is_none());
        assert!(!block.has_children());
    }
}
