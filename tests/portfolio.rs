// tests/portfolio.rs
//! Portfolio, collection lookup and page listing against a fake workspace.

mod common;

use common::*;
use notion_site::{
    fetch_page_summaries, fetch_portfolio, lookup_collection, AppError, PageEntry,
    PropertyTypeValue, RetryPolicy, RichTextItem,
};
use pretty_assertions::assert_eq;

fn work(n: u32, name: &str, url: Option<&str>) -> notion_site::Page {
    let record = with_property(
        page(n, name),
        "Name",
        PropertyTypeValue::Title {
            title: vec![RichTextItem::plain_text(name)],
        },
    );
    match url {
        Some(url) => with_property(
            record,
            "URL",
            PropertyTypeValue::Url {
                url: Some(url.to_string()),
            },
        ),
        None => record,
    }
}

fn entry(n: u32, title: &str) -> PageEntry {
    PageEntry {
        id: hex_id(n),
        title: title.to_string(),
        description: format!("about {}", title),
    }
}

#[tokio::test]
async fn test_portfolio_from_database() {
    let fake = FakeNotion::new().with_database(
        database(50, "Works"),
        vec![
            work(
                51,
                "Light Field",
                Some("https://www.notion.so/Light-Field-0123456789abcdef0123456789abcdef"),
            ),
            work(52, "No Link", None),
        ],
    );

    let portfolio = fetch_portfolio(&fake, &notion_id(50), &RetryPolicy::none())
        .await
        .unwrap();

    assert_eq!(portfolio.database.title.as_plain_text(), "Works");
    assert_eq!(portfolio.works.len(), 2);

    let linked = &portfolio.works[0];
    assert_eq!(linked.name, "Light Field");
    assert_eq!(linked.page_id, "0123456789abcdef0123456789abcdef");
    assert_eq!(linked.url, "/doc/0123456789abcdef0123456789abcdef");

    // Falls back to the record's own id.
    let unlinked = &portfolio.works[1];
    assert_eq!(unlinked.page_id, hex_id(52));
    assert_eq!(unlinked.url, format!("/doc/{}", hex_id(52)));
}

#[tokio::test]
async fn test_page_holding_a_database_is_followed() {
    // 60 is not a database, so it is read as a page.
    let fake = FakeNotion::new()
        .with_page(page(60, "Portfolio page"))
        .with_children(60, vec![paragraph(61, false), child_database(50)])
        .with_database(database(50, "Works"), vec![work(51, "Only", None)]);
    let collection = lookup_collection(&fake, &notion_id(60), &RetryPolicy::none())
        .await
        .unwrap();

    assert_eq!(collection.database.title.as_plain_text(), "Works");
    assert_eq!(collection.results.len(), 1);
    assert_eq!(fake.database_calls(), 2);
}

#[tokio::test]
async fn test_transient_database_failure_is_not_masked() {
    let fake = FakeNotion::new()
        .with_children(60, vec![child_database(50)])
        .always_failing(60, Failure::Reset);

    let err = lookup_collection(&fake, &notion_id(60), &RetryPolicy::none())
        .await
        .unwrap_err();

    assert_eq!(err.error_code().as_deref(), Some("ECONNRESET"));
    assert_eq!(fake.page_calls(), 0);
}

#[tokio::test]
async fn test_page_without_a_database_is_not_found() {
    let fake = FakeNotion::new()
        .with_page(page(60, "Plain page"))
        .with_children(60, vec![paragraph(61, false)]);

    let err = lookup_collection(&fake, &notion_id(60), &RetryPolicy::none())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.status_code(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_database_errors_skip_the_fallback() {
    let fake = FakeNotion::new()
        .with_page(page(60, "Page"))
        .always_failing(60, Failure::Unauthorized);

    let err = lookup_collection(&fake, &notion_id(60), &RetryPolicy::none())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotionService { .. }));
    assert_eq!(fake.page_calls(), 0);
}

#[tokio::test]
async fn test_page_summaries_drop_failures_and_keep_order() {
    let fake = FakeNotion::new()
        .with_page(page(1, "Home"))
        .with_page(page(2, "Broken"))
        .with_page(page(3, "Untitled"))
        .always_failing(2, Failure::Reset);

    let entries = vec![
        entry(1, "Configured home"),
        entry(2, "Broken"),
        entry(3, "Gallery"),
        entry(4, "Missing"),
    ];
    let summaries = fetch_page_summaries(&fake, &entries).await;

    let listed: Vec<(&str, &str)> = summaries
        .iter()
        .map(|summary| (summary.id.as_str(), summary.title.as_str()))
        .collect();
    assert_eq!(
        listed,
        vec![(hex_id(1).as_str(), "Home"), (hex_id(3).as_str(), "Gallery")]
    );
    assert_eq!(summaries[0].url, format!("/doc/{}", hex_id(1)));
    assert_eq!(summaries[1].description, "about Gallery");
}

#[tokio::test]
async fn test_no_entries_no_calls() {
    let fake = FakeNotion::new();
    assert!(fetch_page_summaries(&fake, &[]).await.is_empty());
    assert_eq!(fake.page_calls(), 0);
}
