// src/api/simple_pagination.rs
//! Cursor pagination over any Notion listing endpoint.

use super::types::{PaginatedResponse, PaginationResult};
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;

/// Calls `fetch_fn` with the page size and the previous page's cursor until
/// the listing reports no more results.
pub async fn fetch_all_pages_simple<T, F, Fut>(
    mut fetch_fn: F,
) -> Result<PaginationResult<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_fn(NOTION_API_PAGE_SIZE as u32, cursor).await?;
        pages_fetched += 1;
        items.extend(response.results);

        match response.next_cursor {
            Some(next) if response.has_more => cursor = Some(next),
            _ => break,
        }
    }

    Ok(PaginationResult {
        items,
        pages_fetched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_follows_cursors_until_exhausted() {
        let seen = Mutex::new(Vec::new());
        let seen_ref = &seen;

        let result = fetch_all_pages_simple(
            move |page_size, cursor: Option<String>| async move {
                assert_eq!(page_size, 100);
                seen_ref.lock().unwrap().push(cursor.clone());
                Ok(match cursor.as_deref() {
                    None => PaginatedResponse {
                        object: "list".to_string(),
                        results: vec![1, 2],
                        next_cursor: Some("c1".to_string()),
                        has_more: true,
                    },
                    Some("c1") => PaginatedResponse::complete(vec![3]),
                    Some(other) => panic!("unexpected cursor {}", other),
                })
            },
        )
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3]);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("c1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_error_stops_pagination() {
        let calls = Mutex::new(0);
        let calls_ref = &calls;

        let result: Result<PaginationResult<u8>, _> =
            fetch_all_pages_simple(move |_, cursor: Option<String>| async move {
                *calls_ref.lock().unwrap() += 1;
                match cursor {
                    None => Ok(PaginatedResponse {
                        object: "list".to_string(),
                        results: vec![1],
                        next_cursor: Some("c1".to_string()),
                        has_more: true,
                    }),
                    Some(_) => Err(AppError::InvalidRequest("gone".to_string())),
                }
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
