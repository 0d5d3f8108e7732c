// src/layout.rs
//! Grouping a flattened block list into display units.
//!
//! Both passes are pure. [`group_blocks`] gathers list items into lists and
//! table rows into their table; [`split_sections`] applies the exhibition /
//! project heading rule that puts two sections side by side.

use crate::model::{Block, TableBlock, TableRowBlock};
use serde::Serialize;

/// Heading text that opens the exhibitions (or awards) section.
pub const EXHIBITION_KEYWORDS: &[&str] = &["参展经历", "获奖经历", "获奖", "参展"];

/// Heading text that opens the projects section.
pub const PROJECT_KEYWORDS: &[&str] = &["项目经历", "项目"];

/// One display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum LayoutItem {
    Block { block: Block },
    List { numbered: bool, items: Vec<Block> },
    Table {
        table: TableBlock,
        rows: Vec<TableRowBlock>,
    },
}

/// How a document's items are arranged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionLayout {
    Single {
        items: Vec<LayoutItem>,
    },
    /// Exhibitions on the left, projects on the right.
    TwoColumn {
        before: Vec<LayoutItem>,
        left: Vec<LayoutItem>,
        right: Vec<LayoutItem>,
        after: Vec<LayoutItem>,
    },
}

/// Groups blocks into display units.
///
/// - `column_list` and `column` blocks are skipped.
/// - List items collect into one list until a block arrives that is neither
///   a list item, a table nor a table row. The list is numbered when its
///   first item is.
/// - A table collects the table rows that follow it. Because children are
///   flattened after their siblings, the rows need not be adjacent: the
///   table stays open until a plain block arrives after at least one row, or
///   another table starts. A table that gathered no rows is dropped.
/// - Table rows with no open table stay single blocks.
pub fn group_blocks(blocks: Vec<Block>) -> Vec<LayoutItem> {
    let mut grouped = Vec::new();
    let mut list: Vec<Block> = Vec::new();
    let mut table: Option<(TableBlock, Vec<TableRowBlock>)> = None;

    for block in blocks {
        match block {
            Block::ColumnList(_) | Block::Column(_) => {}
            Block::BulletedListItem(_) | Block::NumberedListItem(_) => list.push(block),
            Block::Table(next) => {
                if let Some(item) = table.take().and_then(finish_table) {
                    grouped.push(item);
                }
                table = Some((next, Vec::new()));
            }
            Block::TableRow(row) => match table.as_mut() {
                Some((_, rows)) => rows.push(row),
                None => grouped.push(LayoutItem::Block {
                    block: Block::TableRow(row),
                }),
            },
            other => {
                if !list.is_empty() {
                    grouped.push(finish_list(std::mem::take(&mut list)));
                }
                if table.as_ref().is_some_and(|(_, rows)| !rows.is_empty()) {
                    grouped.extend(table.take().and_then(finish_table));
                }
                grouped.push(LayoutItem::Block { block: other });
            }
        }
    }

    if !list.is_empty() {
        grouped.push(finish_list(list));
    }
    grouped.extend(table.and_then(finish_table));
    grouped
}

fn finish_list(items: Vec<Block>) -> LayoutItem {
    let numbered = matches!(items.first(), Some(Block::NumberedListItem(_)));
    LayoutItem::List { numbered, items }
}

fn finish_table((table, rows): (TableBlock, Vec<TableRowBlock>)) -> Option<LayoutItem> {
    if rows.is_empty() {
        log::debug!("Dropping table {} with no rows", table.common.id);
        None
    } else {
        Some(LayoutItem::Table { table, rows })
    }
}

/// Plain text of an h2/h3 heading item; the section rule only looks at those.
fn section_heading(item: &LayoutItem) -> Option<String> {
    match item {
        LayoutItem::Block { block } => match block.heading() {
            Some((2 | 3, content)) => Some(content.plain_text()),
            _ => None,
        },
        _ => None,
    }
}

fn any_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Applies the two-column heading rule.
///
/// The first h2/h3 mentioning an exhibition keyword and the first mentioning
/// a project keyword are located independently. Only when the exhibition
/// heading comes strictly first is the layout split: the left column runs up
/// to the project heading, the right column from it to the next h1-h3 that
/// is not itself a project heading. A heading matching both keyword sets is
/// found by both searches, so on its own it never splits the layout.
pub fn split_sections(items: Vec<LayoutItem>) -> SectionLayout {
    let exhibitions = items.iter().position(|item| {
        section_heading(item).is_some_and(|text| any_keyword(&text, EXHIBITION_KEYWORDS))
    });
    let projects = items.iter().position(|item| {
        section_heading(item).is_some_and(|text| any_keyword(&text, PROJECT_KEYWORDS))
    });

    let (left_start, right_start) = match (exhibitions, projects) {
        (Some(e), Some(p)) if e < p => (e, p),
        _ => return SectionLayout::Single { items },
    };

    let right_end = items[right_start + 1..]
        .iter()
        .position(|item| match item {
            LayoutItem::Block { block } => block
                .heading()
                .is_some_and(|(_, content)| !any_keyword(&content.plain_text(), PROJECT_KEYWORDS)),
            _ => false,
        })
        .map(|offset| right_start + 1 + offset)
        .unwrap_or(items.len());

    let mut rest = items;
    let after = rest.split_off(right_end);
    let right = rest.split_off(right_start);
    let left = rest.split_off(left_start);
    let before = rest;

    SectionLayout::TwoColumn {
        before,
        left,
        right,
        after,
    }
}
