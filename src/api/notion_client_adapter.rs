// src/api/notion_client_adapter.rs
//! Converts notion-client's wire types into the domain model.
//!
//! notion-client is only used for its serde definitions; nothing outside
//! `api` sees its types.

use super::responses::{PageMeta, RawBlock};
use crate::error::{AppError, NotionClientError};
use crate::model::blocks::*;
use crate::model::common::BlockCommon;
use crate::model::{
    Block, Database, DatabaseProperty, DatabasePropertyKind, DatabaseTitle, Page, PageTitle,
    Parent, PropertyTypeValue, PropertyValue,
};
use crate::types::{
    Annotations, BlockId, Color, DatabaseId, DateValue, Link, MentionType, NotionId, PageId,
    PropertyName, RichTextItem, RichTextType, SelectOption, User,
};
use notion_client::objects::{
    block as nc_block, database as nc_database, file as nc_file, page as nc_page,
    rich_text as nc_rich_text,
};
use std::collections::HashMap;

/// Convert a notion-client page plus the fields read from the raw body.
pub fn convert_page(notion_page: nc_page::Page, meta: PageMeta) -> Result<Page, AppError> {
    let id = PageId::parse(&notion_page.id)?;
    let parent = convert_parent(notion_page.parent)?;
    let properties = convert_page_properties(notion_page.properties, &meta);

    Ok(Page {
        id,
        title: extract_page_title(&properties),
        url: notion_page.url,
        last_edited_time: meta.last_edited_time,
        cover: meta.cover,
        properties,
        parent: Some(parent),
        archived: notion_page.archived,
    })
}

pub fn convert_database(notion_db: nc_database::Database) -> Result<Database, AppError> {
    let raw_id = notion_db
        .id
        .ok_or_else(|| NotionClientError::ConversionError {
            message: "Database missing required ID field".to_string(),
        })?;

    Ok(Database {
        id: DatabaseId::parse(&raw_id)?,
        title: DatabaseTitle::new(convert_rich_text_array(notion_db.title)),
        url: notion_db.url,
        properties: notion_db
            .properties
            .into_iter()
            .map(|(name, property)| {
                let converted = convert_database_property(&name, property);
                (PropertyName::new(name), converted)
            })
            .collect(),
        parent: Some(convert_parent(notion_db.parent)?),
        archived: notion_db.archived,
    })
}

pub fn convert_block(notion_block: nc_block::Block) -> Result<Block, AppError> {
    use nc_block::BlockType;

    let common = convert_block_common(&notion_block)?;

    let block = match notion_block.block_type {
        BlockType::Paragraph { paragraph } => {
            Block::Paragraph(text_block(common, paragraph.rich_text, paragraph.color))
        }
        BlockType::Heading1 { heading_1 } => {
            Block::Heading1(text_block(common, heading_1.rich_text, heading_1.color))
        }
        BlockType::Heading2 { heading_2 } => {
            Block::Heading2(text_block(common, heading_2.rich_text, heading_2.color))
        }
        BlockType::Heading3 { heading_3 } => {
            Block::Heading3(text_block(common, heading_3.rich_text, heading_3.color))
        }
        BlockType::BulletedListItem { bulleted_list_item } => Block::BulletedListItem(
            text_block(
                common,
                bulleted_list_item.rich_text,
                Some(bulleted_list_item.color),
            ),
        ),
        BlockType::NumberedListItem { numbered_list_item } => Block::NumberedListItem(
            text_block(
                common,
                numbered_list_item.rich_text,
                Some(numbered_list_item.color),
            ),
        ),
        BlockType::Toggle { toggle } => {
            Block::Toggle(text_block(common, toggle.rich_text, Some(toggle.color)))
        }
        BlockType::Quote { quote } => {
            Block::Quote(text_block(common, quote.rich_text, Some(quote.color)))
        }
        BlockType::Template { template } => {
            Block::Template(text_block(common, template.rich_text, None))
        }

        BlockType::ToDo { to_do } => Block::ToDo(ToDoBlock {
            common,
            content: convert_text_content(to_do.rich_text, to_do.color),
            checked: to_do.checked.unwrap_or(false),
        }),
        BlockType::Callout { callout } => Block::Callout(CalloutBlock {
            common,
            icon: callout.icon.map(convert_icon),
            content: convert_text_content(callout.rich_text, Some(callout.color)),
        }),
        BlockType::Code { code } => Block::Code(CodeBlock {
            common,
            language: format!("{:?}", code.language).to_lowercase(),
            caption: convert_rich_text_array(code.caption),
            content: convert_text_content(code.rich_text, None),
        }),
        BlockType::Equation { equation } => Block::Equation(EquationBlock {
            common,
            expression: equation.expression,
        }),

        BlockType::Divider { .. } => Block::Divider(MarkerBlock { common }),
        BlockType::Breadcrumb { .. } => Block::Breadcrumb(MarkerBlock { common }),
        BlockType::TableOfContents { .. } => Block::TableOfContents(MarkerBlock { common }),
        BlockType::ColumnList { .. } => Block::ColumnList(MarkerBlock { common }),
        BlockType::Column { .. } => Block::Column(MarkerBlock { common }),

        BlockType::Image { image } => Block::Image(MediaBlock {
            common,
            file: convert_file_object(image.file_type),
            caption: Vec::new(),
        }),
        BlockType::Video { video } => Block::Video(MediaBlock {
            common,
            file: convert_file_object(video.file_type),
            caption: Vec::new(),
        }),
        BlockType::File { file } => Block::File(MediaBlock {
            common,
            file: convert_file_object(file.file_type),
            caption: convert_rich_text_array(file.caption),
        }),
        BlockType::Pdf { pdf } => Block::Pdf(MediaBlock {
            common,
            file: convert_file_object(pdf.file_type),
            caption: convert_rich_text_array(pdf.caption),
        }),

        BlockType::Bookmark { bookmark } => Block::Bookmark(BookmarkBlock {
            common,
            url: bookmark.url,
            caption: convert_rich_text_array(bookmark.caption),
        }),
        BlockType::Embed { embed } => Block::Embed(UrlBlock {
            common,
            url: embed.url,
        }),
        BlockType::LinkPreview { link_preview } => Block::LinkPreview(UrlBlock {
            common,
            url: link_preview.url,
        }),

        BlockType::ChildPage { child_page } => Block::ChildPage(ChildBlock {
            common,
            title: child_page.title,
        }),
        BlockType::ChildDatabase { child_database } => Block::ChildDatabase(ChildBlock {
            common,
            title: child_database.title,
        }),
        BlockType::LinkToPage { link_to_page } => match link_to_page {
            notion_client::objects::parent::Parent::PageId { page_id } => {
                Block::LinkToPage(LinkToPageBlock {
                    common,
                    page_id: PageId::parse(&page_id)?,
                })
            }
            _ => Block::Unsupported(UnsupportedBlock {
                common,
                block_type: "link_to_page".to_string(),
            }),
        },

        BlockType::Table { table } => Block::Table(TableBlock {
            common,
            table_width: table.table_width as usize,
            has_column_header: table.has_column_header,
            has_row_header: table.has_row_header,
        }),
        BlockType::TableRow { table_row } => Block::TableRow(TableRowBlock {
            common,
            cells: table_row
                .cells
                .into_iter()
                .map(convert_rich_text_array)
                .collect(),
        }),

        BlockType::SyncedBlock { synced_block } => Block::SyncedBlock(SyncedBlock {
            common,
            synced_from: synced_block.synced_from.and_then(|from| match from {
                nc_block::SyncedFrom::BlockId { block_id } => BlockId::parse(&block_id)
                    .map_err(|e| log::warn!("Ignoring synced_from '{}': {}", block_id, e))
                    .ok(),
            }),
        }),

        other => {
            let block_type = block_type_name(&other);
            log::debug!("Block {} has unsupported type '{}'", common.id, block_type);
            Block::Unsupported(UnsupportedBlock { common, block_type })
        }
    };

    Ok(block)
}

/// A block whose type notion-client cannot deserialize keeps its id,
/// children flag and type name.
pub fn convert_raw_block(raw: RawBlock) -> Result<Block, AppError> {
    log::debug!("Block {} has unrecognised type '{}'", raw.id, raw.block_type);
    Ok(Block::Unsupported(UnsupportedBlock {
        common: BlockCommon {
            id: BlockId::parse(&raw.id)?,
            has_children: raw.has_children,
            archived: raw.archived,
        },
        block_type: raw.block_type,
    }))
}

fn block_type_name(block_type: &nc_block::BlockType) -> String {
    serde_json::to_value(block_type)
        .ok()
        .and_then(|value| value.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "unsupported".to_string())
}

fn convert_parent(notion_parent: notion_client::objects::parent::Parent) -> Result<Parent, AppError> {
    use notion_client::objects::parent::Parent as NcParent;

    match notion_parent {
        NcParent::PageId { page_id } => Ok(Parent::Page {
            page_id: PageId::parse(&page_id)?,
        }),
        NcParent::DatabaseId { database_id } => Ok(Parent::Database {
            database_id: DatabaseId::parse(&database_id)?,
        }),
        NcParent::BlockId { block_id } => Ok(Parent::Block {
            block_id: BlockId::parse(&block_id)?,
        }),
        NcParent::Workspace { .. } => Ok(Parent::Workspace),
        _ => Err(NotionClientError::ConversionError {
            message: "Unsupported parent type".to_string(),
        }
        .into()),
    }
}

fn convert_block_common(notion_block: &nc_block::Block) -> Result<BlockCommon, AppError> {
    let raw_id = notion_block
        .id
        .as_deref()
        .ok_or_else(|| NotionClientError::ConversionError {
            message: "Block missing required ID field".to_string(),
        })?;

    Ok(BlockCommon {
        id: BlockId::parse(raw_id)?,
        has_children: notion_block.has_children.unwrap_or(false),
        archived: notion_block.archived.unwrap_or(false),
    })
}

fn text_block(
    common: BlockCommon,
    rich_text: Vec<nc_rich_text::RichText>,
    color: Option<nc_block::TextColor>,
) -> TextBlock {
    TextBlock {
        common,
        content: convert_text_content(rich_text, color),
    }
}

fn convert_text_content(
    rich_text: Vec<nc_rich_text::RichText>,
    color: Option<nc_block::TextColor>,
) -> TextBlockContent {
    TextBlockContent {
        rich_text: convert_rich_text_array(rich_text),
        color: color.map(convert_block_color).unwrap_or_default(),
    }
}

fn convert_rich_text_array(rich_texts: Vec<nc_rich_text::RichText>) -> Vec<RichTextItem> {
    rich_texts.into_iter().map(convert_rich_text).collect()
}

fn convert_rich_text(rich_text: nc_rich_text::RichText) -> RichTextItem {
    use nc_rich_text::RichText as NcRichText;

    match rich_text {
        NcRichText::Text {
            text,
            annotations,
            plain_text,
            href,
        } => RichTextItem {
            text_type: RichTextType::Text {
                content: text.content,
                link: text.link.map(|link| Link { url: link.url }),
            },
            annotations: annotations.map(convert_annotations).unwrap_or_default(),
            plain_text: plain_text.unwrap_or_default(),
            href,
        },

        NcRichText::Mention {
            mention,
            annotations,
            plain_text,
            href,
        } => {
            // Mentions we can't model degrade to a link on the item's href.
            let mention = convert_mention(mention).unwrap_or_else(|| MentionType::Link {
                url: href.clone().unwrap_or_default(),
            });
            RichTextItem {
                text_type: RichTextType::Mention { mention },
                annotations: convert_annotations(annotations),
                plain_text,
                href,
            }
        }

        NcRichText::Equation {
            equation,
            annotations,
            plain_text,
            href,
        } => RichTextItem {
            text_type: RichTextType::Equation {
                expression: equation.expression,
            },
            annotations: convert_annotations(annotations),
            plain_text,
            href,
        },

        _ => RichTextItem::plain_text(""),
    }
}

fn convert_annotations(annotations: nc_rich_text::Annotations) -> Annotations {
    Annotations {
        bold: annotations.bold,
        italic: annotations.italic,
        strikethrough: annotations.strikethrough,
        underline: annotations.underline,
        code: annotations.code,
        color: convert_rich_text_color(annotations.color),
    }
}

fn convert_mention(mention: nc_rich_text::Mention) -> Option<MentionType> {
    use nc_rich_text::Mention as NcMention;

    match mention {
        NcMention::User { user } => Some(MentionType::User { name: user.name }),
        NcMention::Page { page } => NotionId::parse(&page.id)
            .ok()
            .map(|id| MentionType::Page { id }),
        NcMention::Database { database } => NotionId::parse(&database.id)
            .ok()
            .map(|id| MentionType::Database { id }),
        NcMention::Date { date } => Some(MentionType::Date {
            date: DateValue {
                start: date.start.to_rfc3339(),
                end: date.end.map(|end| end.to_rfc3339()),
                time_zone: date.time_zone,
            },
        }),
        NcMention::LinkPreview { link_preview } => Some(MentionType::Link {
            url: link_preview.url,
        }),
        _ => None,
    }
}

fn convert_file_object(file: nc_file::File) -> FileObject {
    match file {
        nc_file::File::External { external } => FileObject::External {
            external: ExternalFile { url: external.url },
        },
        nc_file::File::File { file } => FileObject::File {
            file: NotionFile {
                url: file.url,
                expiry_time: Some(file.expiry_time),
            },
        },
    }
}

fn convert_icon(icon: nc_block::Icon) -> Icon {
    match icon {
        nc_block::Icon::Emoji(notion_client::objects::emoji::Emoji::Emoji { emoji }) => {
            Icon::Emoji { emoji }
        }
        nc_block::Icon::File(file) => match convert_file_object(file) {
            FileObject::File { file } => Icon::File { file },
            FileObject::External { external } => Icon::External { external },
        },
    }
}

/// Generates a conversion from one of notion-client's color enums. The
/// `with_backgrounds` form folds each `*Background` variant into its base.
macro_rules! impl_color_conversion {
    ($fn_name:ident, $source:ty) => {
        fn $fn_name(color: $source) -> Color {
            match color {
                <$source>::Default => Color::Default,
                <$source>::Gray => Color::Gray,
                <$source>::Brown => Color::Brown,
                <$source>::Orange => Color::Orange,
                <$source>::Yellow => Color::Yellow,
                <$source>::Green => Color::Green,
                <$source>::Blue => Color::Blue,
                <$source>::Purple => Color::Purple,
                <$source>::Pink => Color::Pink,
                <$source>::Red => Color::Red,
            }
        }
    };
    ($fn_name:ident, $source:ty, with_backgrounds) => {
        fn $fn_name(color: $source) -> Color {
            match color {
                <$source>::Default => Color::Default,
                <$source>::Gray | <$source>::GrayBackground => Color::Gray,
                <$source>::Brown | <$source>::BrownBackground => Color::Brown,
                <$source>::Orange | <$source>::OrangeBackground => Color::Orange,
                <$source>::Yellow | <$source>::YellowBackground => Color::Yellow,
                <$source>::Green | <$source>::GreenBackground => Color::Green,
                <$source>::Blue | <$source>::BlueBackground => Color::Blue,
                <$source>::Purple | <$source>::PurpleBackground => Color::Purple,
                <$source>::Pink | <$source>::PinkBackground => Color::Pink,
                <$source>::Red | <$source>::RedBackground => Color::Red,
            }
        }
    };
}

impl_color_conversion!(convert_block_color, nc_block::TextColor, with_backgrounds);
impl_color_conversion!(
    convert_rich_text_color,
    nc_rich_text::TextColor,
    with_backgrounds
);
impl_color_conversion!(convert_database_color, nc_database::Color);
impl_color_conversion!(convert_page_color, nc_page::Color);

/// The plain text of the page's title property, "Untitled" when it is
/// missing or empty.
fn extract_page_title(properties: &HashMap<PropertyName, PropertyValue>) -> PageTitle {
    let title = properties.values().find_map(|property| match &property.value {
        PropertyTypeValue::Title { title } => Some(crate::types::plain_text_of(title)),
        _ => None,
    });

    match title {
        Some(text) if !text.is_empty() => PageTitle::new(text),
        _ => PageTitle::new(PageTitle::UNTITLED),
    }
}

fn convert_page_properties(
    properties: HashMap<String, nc_page::PageProperty>,
    meta: &PageMeta,
) -> HashMap<PropertyName, PropertyValue> {
    properties
        .into_iter()
        .map(|(name, property)| {
            let value = match (property, meta.raw_date(&name)) {
                (nc_page::PageProperty::Date { .. }, Some(raw)) => PropertyTypeValue::Date {
                    date: raw.start.clone().map(|start| DateValue {
                        start,
                        end: raw.end.clone(),
                        time_zone: raw.time_zone.clone(),
                    }),
                },
                (property, _) => convert_page_property(property),
            };
            (PropertyName::new(name.clone()), PropertyValue::new(name, value))
        })
        .collect()
}

fn resolve_date(dod: nc_page::DateOrDateTime) -> String {
    match dod {
        nc_page::DateOrDateTime::Date(d) => d.format("%Y-%m-%d").to_string(),
        nc_page::DateOrDateTime::DateTime(dt) => dt.to_rfc3339(),
    }
}

/// A date property without a start carries no usable date.
fn convert_notion_date(d: nc_page::DatePropertyValue) -> Option<DateValue> {
    Some(DateValue {
        start: resolve_date(d.start?),
        end: d.end.map(resolve_date),
        time_zone: d.time_zone,
    })
}

fn convert_select_option(s: nc_page::SelectPropertyValue) -> SelectOption {
    SelectOption {
        id: s.id.unwrap_or_default(),
        name: s.name.unwrap_or_default(),
        color: s.color.map(convert_page_color).unwrap_or_default(),
    }
}

fn convert_file_ref(f: nc_page::FilePropertyValue) -> crate::types::File {
    let (url, expiry_time) = match f.file {
        nc_file::File::External { external } => (external.url, None),
        nc_file::File::File { file } => (file.url, Some(file.expiry_time)),
    };
    crate::types::File {
        name: f.name,
        url,
        expiry_time,
    }
}

fn convert_page_property(property: nc_page::PageProperty) -> PropertyTypeValue {
    use nc_page::PageProperty;

    match property {
        PageProperty::Title { title, .. } => PropertyTypeValue::Title {
            title: convert_rich_text_array(title),
        },
        PageProperty::RichText { rich_text, .. } => PropertyTypeValue::RichText {
            rich_text: convert_rich_text_array(rich_text),
        },
        PageProperty::Number { number, .. } => PropertyTypeValue::Number {
            number: number.and_then(|n| n.as_f64()),
        },
        PageProperty::Checkbox { checkbox, .. } => PropertyTypeValue::Checkbox { checkbox },
        PageProperty::Url { url, .. } => PropertyTypeValue::Url { url },
        PageProperty::Email { email, .. } => PropertyTypeValue::Email { email },
        PageProperty::PhoneNumber { phone_number, .. } => {
            PropertyTypeValue::PhoneNumber { phone_number }
        }
        PageProperty::Select { select, .. } => PropertyTypeValue::Select {
            select: select.map(convert_select_option),
        },
        PageProperty::MultiSelect { multi_select, .. } => PropertyTypeValue::MultiSelect {
            multi_select: multi_select
                .into_iter()
                .map(convert_select_option)
                .collect(),
        },
        PageProperty::Status { status, .. } => PropertyTypeValue::Status {
            status: status.map(convert_select_option),
        },
        PageProperty::Date { date, .. } => PropertyTypeValue::Date {
            date: date.and_then(convert_notion_date),
        },
        PageProperty::People { people, .. } => PropertyTypeValue::People {
            people: people
                .into_iter()
                .map(|user| User {
                    id: user.id,
                    name: user.name,
                })
                .collect(),
        },
        PageProperty::Files { files, .. } => PropertyTypeValue::Files {
            files: files.into_iter().map(convert_file_ref).collect(),
        },
        PageProperty::CreatedTime { created_time, .. } => {
            PropertyTypeValue::CreatedTime { created_time }
        }
        PageProperty::LastEditedTime {
            last_edited_time, ..
        } => PropertyTypeValue::LastEditedTime { last_edited_time },
        PageProperty::Relation { relation, .. } => PropertyTypeValue::Relation {
            relation: relation
                .into_iter()
                .filter_map(|r| {
                    PageId::parse(&r.id)
                        .map_err(|e| log::warn!("Skipping relation with invalid ID '{}': {}", r.id, e))
                        .ok()
                })
                .collect(),
        },
        PageProperty::Formula { .. } => other("formula"),
        PageProperty::Rollup { .. } => other("rollup"),
        PageProperty::CreatedBy { .. } => other("created_by"),
        PageProperty::LastEditedBy { .. } => other("last_edited_by"),
        PageProperty::UniqueID { .. } => other("unique_id"),
        PageProperty::Verification { .. } => other("verification"),
        PageProperty::Button { .. } => other("button"),
    }
}

fn other(kind: &str) -> PropertyTypeValue {
    PropertyTypeValue::Other {
        kind: kind.to_string(),
    }
}

fn convert_database_property(
    name: &str,
    property: nc_database::DatabaseProperty,
) -> DatabaseProperty {
    use nc_database::DatabaseProperty as NcProperty;

    let options = |options: Vec<nc_database::OptionValue>| -> Vec<SelectOption> {
        options
            .into_iter()
            .map(|opt| SelectOption {
                id: opt.id.unwrap_or_default(),
                name: opt.name,
                color: convert_database_color(opt.color.unwrap_or_default()),
            })
            .collect()
    };

    let kind = match property {
        NcProperty::Title { .. } => DatabasePropertyKind::Title,
        NcProperty::RichText { .. } => DatabasePropertyKind::RichText,
        NcProperty::Number { .. } => DatabasePropertyKind::Number,
        NcProperty::Select { select, .. } => DatabasePropertyKind::Select {
            options: options(select.options),
        },
        NcProperty::MultiSelect { multi_select, .. } => DatabasePropertyKind::MultiSelect {
            options: options(multi_select.options),
        },
        NcProperty::Status { status, .. } => DatabasePropertyKind::Status {
            options: options(status.options),
        },
        NcProperty::Date { .. } => DatabasePropertyKind::Date,
        NcProperty::Checkbox { .. } => DatabasePropertyKind::Checkbox,
        NcProperty::Url { .. } => DatabasePropertyKind::Url,
        NcProperty::Email { .. } => DatabasePropertyKind::Email,
        NcProperty::PhoneNumber { .. } => DatabasePropertyKind::PhoneNumber,
        NcProperty::Files { .. } => DatabasePropertyKind::Files,
        NcProperty::Relation { .. } => DatabasePropertyKind::Relation,
        NcProperty::Formula { .. } => DatabasePropertyKind::Formula,
        NcProperty::Rollup { .. } => DatabasePropertyKind::Rollup,
        NcProperty::CreatedTime { .. } => DatabasePropertyKind::CreatedTime,
        NcProperty::LastEditedTime { .. } => DatabasePropertyKind::LastEditedTime,
        _ => {
            log::debug!("Database property '{}' has a kind this service ignores", name);
            DatabasePropertyKind::Other
        }
    };

    DatabaseProperty {
        name: PropertyName::new(name),
        kind,
    }
}
