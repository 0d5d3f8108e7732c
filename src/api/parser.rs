// src/api/parser.rs
//! Turns raw Notion API responses into domain objects or typed errors.

use super::client::ApiResponse;
use super::notion_client_adapter::convert_raw_block;
use super::responses::{
    NotionBlock, NotionDatabase, NotionError, NotionPage, PageMeta, RawBlock, ToDomain,
};
use super::types::PaginatedResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use crate::model::{Block, Database, Page};
use reqwest::StatusCode;
use serde_json::Value;

/// Parses a successful body as `T`, or the error body into an `AppError`.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_body(&result.data, &result.url)
    } else {
        Err(parse_error_body(&result.data, result.status, &result.url))
    }
}

fn parse_body<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: preview(body),
        }
        .into()
    })
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

/// Maps a Notion error body onto a typed service error, falling back to the
/// bare HTTP status when the body is not a Notion error object.
pub fn parse_error_body(body: &str, status: StatusCode, url: &str) -> AppError {
    match serde_json::from_str::<NotionError>(body) {
        Ok(error) => AppError::NotionService {
            code: NotionErrorCode::from_api_response(&error.code),
            message: error.message,
            status,
        },
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status.as_u16()),
            message: format!("HTTP {} from {}", status, url),
            status,
        },
    }
}

fn page_from_value(value: Value) -> Result<Page, AppError> {
    let meta: PageMeta = serde_json::from_value(value.clone())?;
    let page: NotionPage = serde_json::from_value(value)?;
    (page, meta).to_domain()
}

/// Block types notion-client does not know (audio, new additions) become
/// `Block::Unsupported` instead of failing the whole listing.
fn block_from_value(value: Value) -> Result<Block, AppError> {
    match serde_json::from_value::<NotionBlock>(value.clone()) {
        Ok(block) => block.to_domain(),
        Err(e) => {
            let raw: RawBlock = serde_json::from_value(value)?;
            log::warn!("Keeping block {} as unsupported: {}", raw.id, e);
            convert_raw_block(raw)
        }
    }
}

pub fn parse_page_response(result: ApiResponse<String>) -> Result<Page, AppError> {
    page_from_value(parse_api_response(result)?)
}

pub fn parse_database_response(result: ApiResponse<String>) -> Result<Database, AppError> {
    let notion_database: NotionDatabase = parse_api_response(result)?;
    notion_database.to_domain()
}

/// Parses one page of a database query.
pub fn parse_pages_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Page>, AppError> {
    let response: PaginatedResponse<Value> = parse_api_response(result)?;
    let pages = response
        .results
        .into_iter()
        .map(page_from_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResponse {
        object: response.object,
        results: pages,
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    })
}

/// Parses one page of a block-children listing.
pub fn parse_blocks_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let response: PaginatedResponse<Value> = parse_api_response(result)?;
    let blocks = response
        .results
        .into_iter()
        .map(block_from_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResponse {
        object: response.object,
        results: blocks,
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    })
}
