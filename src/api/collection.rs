// src/api/collection.rs
//! Database listings and the portfolio built from one.

use super::types::PaginatedResponse;
use super::NotionRepository;
use crate::constants::DOCUMENT_PATH_PREFIX;
use crate::error::AppError;
use crate::error_recovery::{retry_transient, RetryPolicy};
use crate::model::{Block, Database, DatabaseTitle, Page};
use crate::types::{DatabaseId, NotionId};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// A Notion page URL ends in `-<32 hex>`, optionally followed by a query.
    static ref PAGE_ID_IN_URL: Regex = Regex::new(r"-([0-9a-fA-F]{32})(?:\?|$)")
        .expect("Failed to compile page URL regex - this is a bug in the code");
}

const NAME_PROPERTIES: &[&str] = &["Name", "作品名称"];
const URL_PROPERTIES: &[&str] = &["URL", "url", "Url"];
const PAGE_ID_PROPERTIES: &[&str] = &["Page ID", "页面ID", "page_id", "PageID", "PageId"];
const COVER_PROPERTIES: &[&str] = &["image", "Image", "Cover", "封面", "cover", "Cover Image"];
const DESCRIPTION_PROPERTIES: &[&str] = &["Description", "描述", "description"];
const CATEGORY_PROPERTIES: &[&str] = &["Category", "分类", "category"];
const DATE_PROPERTIES: &[&str] = &["Date", "日期", "date"];

/// Name given to works whose record has no title.
pub const UNTITLED_WORK: &str = "未命名作品";

/// A database with the first page of its rows.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub database: Database,
    pub results: Vec<Page>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// One entry of the portfolio, derived from a database record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSummary {
    pub id: String,
    pub name: String,
    pub page_id: String,
    pub cover_image: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioDatabase {
    pub title: DatabaseTitle,
    pub id: DatabaseId,
}

#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub database: PortfolioDatabase,
    pub works: Vec<WorkSummary>,
}

impl WorkSummary {
    /// Maps a record onto the fields the portfolio shows.
    ///
    /// Each field is read from the first of its recognised property names
    /// that the record has. The content page id comes from a URL property,
    /// then an explicit page-id property, then the record's own id.
    pub fn from_record(record: &Page) -> Self {
        let name = record
            .first_property(NAME_PROPERTIES)
            .and_then(|p| p.as_title())
            .map(crate::types::plain_text_of)
            .unwrap_or_else(|| UNTITLED_WORK.to_string());

        let page_id = page_id_from_url(record)
            .or_else(|| page_id_from_property(record))
            .unwrap_or_else(|| record.id.as_str().to_string());

        let cover_image = record
            .first_property(COVER_PROPERTIES)
            .and_then(|p| p.as_files())
            .and_then(|files| files.first())
            .map(|file| file.url.clone())
            .or_else(|| record.cover.as_ref().map(|cover| cover.url().to_string()));

        let description = record
            .first_property(DESCRIPTION_PROPERTIES)
            .and_then(|p| p.as_rich_text())
            .map(crate::types::plain_text_of)
            .unwrap_or_default();

        let category = record
            .first_property(CATEGORY_PROPERTIES)
            .and_then(|p| p.as_select())
            .map(|option| option.name.clone());

        let date = record
            .first_property(DATE_PROPERTIES)
            .and_then(|p| p.as_date())
            .map(|date| date.start_date().to_string());

        Self {
            id: record.id.to_dashed(),
            name,
            url: format!("{}{}", DOCUMENT_PATH_PREFIX, page_id),
            page_id,
            cover_image,
            description,
            category,
            date,
        }
    }
}

fn page_id_from_url(record: &Page) -> Option<String> {
    let url = record.first_property(URL_PROPERTIES)?.as_url()?;
    PAGE_ID_IN_URL
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

fn page_id_from_property(record: &Page) -> Option<String> {
    let text = record.first_property(PAGE_ID_PROPERTIES)?.text()?;
    let id = text.replace('-', "");
    (!id.is_empty()).then_some(id)
}

/// Retrieves a database and one page of its rows, starting at `cursor`.
pub async fn fetch_collection(
    repository: &dyn NotionRepository,
    id: &NotionId,
    cursor: Option<String>,
    retry: &RetryPolicy,
) -> Result<Collection, AppError> {
    let database = retry_transient(retry, || repository.retrieve_database(id)).await?;
    let rows: PaginatedResponse<Page> = retry_transient(retry, || {
        repository.query_database_page(id, cursor.clone())
    })
    .await?;

    log::debug!(
        "Database {} returned {} row(s), has_more={}",
        id,
        rows.results.len(),
        rows.has_more
    );

    Ok(Collection {
        database,
        results: rows.results,
        has_more: rows.has_more,
        next_cursor: rows.next_cursor,
    })
}

/// Resolves `id` to a collection. An id that Notion rejects as a database
/// is retried as a page, using the first inline database on it.
pub async fn lookup_collection(
    repository: &dyn NotionRepository,
    id: &NotionId,
    retry: &RetryPolicy,
) -> Result<Collection, AppError> {
    match fetch_collection(repository, id, None, retry).await {
        Ok(collection) => Ok(collection),
        Err(e) if e.is_not_found() || e.is_validation_failure() => {
            log::info!("{} is not a database ({}), looking inside it as a page", id, e);
            collection_in_page(repository, id, retry)
                .await
                .map_err(|fallback| {
                    log::warn!("No database reachable through page {}: {}", id, fallback);
                    if fallback.transient_failure().is_some() {
                        fallback
                    } else {
                        AppError::NotFound(format!(
                            "No database or page with a database found for {}",
                            id
                        ))
                    }
                })
        }
        Err(e) => Err(e),
    }
}

async fn collection_in_page(
    repository: &dyn NotionRepository,
    page_id: &NotionId,
    retry: &RetryPolicy,
) -> Result<Collection, AppError> {
    retry_transient(retry, || repository.retrieve_page(page_id)).await?;
    let children =
        retry_transient(retry, || repository.retrieve_children_page(page_id, None)).await?;

    let database_id = children
        .results
        .iter()
        .find(|block| matches!(block, Block::ChildDatabase(_)))
        .map(|block| NotionId::from(block.id()))
        .ok_or_else(|| AppError::NotFound(format!("Page {} holds no database", page_id)))?;

    log::info!("Using database {} found in page {}", database_id, page_id);
    fetch_collection(repository, &database_id, None, retry).await
}

/// Builds the portfolio from the configured database (or page holding one).
pub async fn fetch_portfolio(
    repository: &dyn NotionRepository,
    database_id: &NotionId,
    retry: &RetryPolicy,
) -> Result<Portfolio, AppError> {
    let collection = lookup_collection(repository, database_id, retry).await?;

    let works: Vec<WorkSummary> = collection
        .results
        .iter()
        .map(WorkSummary::from_record)
        .filter(|work| !work.page_id.is_empty())
        .collect();

    if works.is_empty() && !collection.results.is_empty() {
        log::warn!(
            "Database {} has {} record(s) but none with a page id",
            collection.database.id,
            collection.results.len()
        );
    }

    Ok(Portfolio {
        database: PortfolioDatabase {
            title: collection.database.title,
            id: collection.database.id,
        },
        works,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileObject, PageTitle, PropertyTypeValue, PropertyValue};
    use crate::model::{ExternalFile, NotionFile};
    use crate::types::{DateValue, File, PageId, RichTextItem, SelectOption};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const RECORD_ID: &str = "11111111-2222-3333-4444-555555555555";

    fn record(properties: Vec<(&str, PropertyTypeValue)>) -> Page {
        Page {
            id: PageId::parse(RECORD_ID).unwrap(),
            title: PageTitle::new("record"),
            url: "https://www.notion.so/record".to_string(),
            last_edited_time: None,
            cover: None,
            properties: properties
                .into_iter()
                .map(|(name, value)| (name.into(), PropertyValue::new(name, value)))
                .collect::<HashMap<_, _>>(),
            parent: None,
            archived: false,
        }
    }

    fn url(value: &str) -> PropertyTypeValue {
        PropertyTypeValue::Url {
            url: Some(value.to_string()),
        }
    }

    fn rich_text(value: &str) -> PropertyTypeValue {
        PropertyTypeValue::RichText {
            rich_text: vec![RichTextItem::plain_text(value)],
        }
    }

    #[test]
    fn test_page_id_from_url_property() {
        let work = WorkSummary::from_record(&record(vec![(
            "URL",
            url("https://www.notion.so/HOVER-2d974318f7ec8063ab63ecd5a7ecddbe"),
        )]));

        assert_eq!(work.page_id, "2d974318f7ec8063ab63ecd5a7ecddbe");
        assert_eq!(work.url, "/doc/2d974318f7ec8063ab63ecd5a7ecddbe");
    }

    #[test]
    fn test_url_with_query_string_still_matches() {
        let work = WorkSummary::from_record(&record(vec![(
            "url",
            url("https://notion.so/Work-ABCDEF0123456789abcdef0123456789?pvs=4"),
        )]));
        assert_eq!(work.page_id, "ABCDEF0123456789abcdef0123456789");
    }

    #[test]
    fn test_url_without_id_falls_through_to_page_id_property() {
        let work = WorkSummary::from_record(&record(vec![
            ("URL", url("https://example.com/about")),
            ("页面ID", rich_text("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee")),
        ]));
        assert_eq!(work.page_id, "aaaaaaaabbbbccccddddeeeeeeeeeeee");
    }

    #[test]
    fn test_record_id_is_the_last_resort() {
        let work = WorkSummary::from_record(&record(vec![]));

        assert_eq!(work.page_id, "11111111222233334444555555555555");
        assert_eq!(work.url, "/doc/11111111222233334444555555555555");
        assert_eq!(work.id, RECORD_ID);
        assert_eq!(work.name, UNTITLED_WORK);
    }

    #[test]
    fn test_fields_from_recognised_properties() {
        let mut page = record(vec![
            (
                "作品名称",
                PropertyTypeValue::Title {
                    title: vec![RichTextItem::plain_text("HOVER")],
                },
            ),
            ("描述", rich_text("新媒体艺术项目")),
            (
                "分类",
                PropertyTypeValue::Select {
                    select: Some(SelectOption {
                        id: "1".to_string(),
                        name: "Installation".to_string(),
                        color: Default::default(),
                    }),
                },
            ),
            (
                "Date",
                PropertyTypeValue::Date {
                    date: Some(DateValue {
                        start: "2024-03-09T01:00:00.000+08:00".to_string(),
                        end: None,
                        time_zone: None,
                    }),
                },
            ),
            (
                "Cover",
                PropertyTypeValue::Files {
                    files: vec![File {
                        name: "cover.png".to_string(),
                        url: "https://files.example/cover.png".to_string(),
                        expiry_time: None,
                    }],
                },
            ),
        ]);
        page.cover = Some(FileObject::External {
            external: ExternalFile {
                url: "https://img.example/page-cover.png".to_string(),
            },
        });

        let work = WorkSummary::from_record(&page);
        assert_eq!(work.name, "HOVER");
        assert_eq!(work.description, "新媒体艺术项目");
        assert_eq!(work.category.as_deref(), Some("Installation"));
        assert_eq!(work.date.as_deref(), Some("2024-03-09"));
        assert_eq!(
            work.cover_image.as_deref(),
            Some("https://files.example/cover.png")
        );
    }

    #[test]
    fn test_page_cover_used_when_no_cover_property() {
        let mut page = record(vec![("image", PropertyTypeValue::Files { files: vec![] })]);
        page.cover = Some(FileObject::File {
            file: NotionFile {
                url: "https://s3.example/hosted.png".to_string(),
                expiry_time: None,
            },
        });

        let work = WorkSummary::from_record(&page);
        assert_eq!(
            work.cover_image.as_deref(),
            Some("https://s3.example/hosted.png")
        );
    }

    #[test]
    fn test_name_property_of_wrong_kind_is_untitled() {
        let work = WorkSummary::from_record(&record(vec![("Name", rich_text("not a title"))]));
        assert_eq!(work.name, UNTITLED_WORK);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(WorkSummary::from_record(&record(vec![]))).unwrap();
        for field in [
            "id",
            "name",
            "pageId",
            "coverImage",
            "description",
            "category",
            "date",
            "url",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
    }
}
