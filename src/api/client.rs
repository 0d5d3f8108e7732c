// src/api/client.rs
//! HTTP client for the Notion API.
//!
//! A thin wrapper around reqwest: authentication, the pinned API version and
//! an optional outbound proxy. Parsing lives in `parser`.

use super::types::PaginatedResponse;
use crate::constants::{NOTION_API_BASE_URL, NOTION_VERSION};
use crate::error::{AppError, NotionClientError};
use crate::model::{Block, Database, Page};
use crate::types::{ApiKey, NotionId, ValidatedUrl};
use reqwest::{header, Client, Response};
use serde::Serialize;
use std::time::Duration;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a client that authenticates with `api_key` and, when given,
    /// sends every request through `proxy`. A request still unanswered
    /// after `timeout` fails as a timeout and is retried like one.
    pub fn new(
        api_key: &ApiKey,
        proxy: Option<&ValidatedUrl>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut builder = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .timeout(timeout);

        // Proxy variables are resolved into `proxy` by the config layer.
        builder = match proxy {
            Some(proxy) => {
                log::info!("Routing Notion API requests through proxy {}", proxy.redacted());
                builder.proxy(reqwest::Proxy::all(proxy.as_str())?)
            }
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            base_url: NOTION_API_BASE_URL.to_string(),
        })
    }

    /// Points the client at another API root, e.g. a local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to `endpoint` (a path below the API root).
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with a JSON body to `endpoint`.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        let endpoint = format!("pages/{}", id.to_hyphenated());
        let response = self.get(&endpoint).await?;
        let result = extract_response_text(response).await?;
        super::parser::parse_page_response(result)
    }

    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError> {
        let endpoint = format!("databases/{}", id.to_hyphenated());
        let response = self.get(&endpoint).await?;
        let result = extract_response_text(response).await?;
        super::parser::parse_database_response(result)
    }

    async fn retrieve_children_page(
        &self,
        parent: &NotionId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        let mut endpoint = format!(
            "blocks/{}/children?page_size={}",
            parent.to_hyphenated(),
            crate::constants::NOTION_API_PAGE_SIZE
        );
        if let Some(cursor) = cursor {
            endpoint.push_str("&start_cursor=");
            endpoint.push_str(&cursor);
        }
        let response = self.get(&endpoint).await?;
        let result = extract_response_text(response).await?;
        super::parser::parse_blocks_pagination(result)
    }

    async fn query_database_page(
        &self,
        database: &NotionId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Page>, AppError> {
        let endpoint = format!("databases/{}/query", database.to_hyphenated());
        let mut query = serde_json::json!({
            "page_size": crate::constants::NOTION_API_PAGE_SIZE
        });
        if let Some(cursor) = cursor {
            query["start_cursor"] = serde_json::json!(cursor);
        }
        let response = self.post(&endpoint, &query).await?;
        let result = extract_response_text(response).await?;
        super::parser::parse_pages_pagination(result)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Reads the whole response body along with its status and URL.
///
/// A connection dropped while the body is streaming surfaces as a transport
/// error so it can be classified and retried like a failed request.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    log::debug!("{} {}", status, url);

    let text = response.text().await.map_err(|e| {
        if e.is_timeout() {
            AppError::from(e)
        } else {
            NotionClientError::Transport {
                message: format!("{}: {:?}", e, e),
            }
            .into()
        }
    })?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NotionRepository;
    use crate::error::TransientFailure;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever writing a response.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let api_key = ApiKey::new("secret_abcdefghijklmnopqrstuvwxyz").unwrap();
        let client = NotionHttpClient::new(&api_key, None, Duration::from_millis(200))
            .unwrap()
            .with_base_url(format!("http://{}/v1/", addr));
        let id = NotionId::parse("a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6").unwrap();

        let err = client.retrieve_page(&id).await.unwrap_err();
        server.abort();

        assert_eq!(err.transient_failure(), Some(TransientFailure::TimedOut));
        assert_eq!(err.status_code(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code().as_deref(), Some("ETIMEDOUT"));
    }
}
