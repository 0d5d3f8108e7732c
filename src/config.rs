// src/config.rs
use crate::constants::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_DELAY_MS,
};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::types::{ApiKey, ValidatedUrl};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables holding the Notion integration token, in order.
const TOKEN_VARS: [&str; 2] = ["NOTION_API_TOKEN", "NOTION_API_KEY"];

/// Environment variables naming an outbound proxy, in order.
const PROXY_VARS: [&str; 4] = ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"];

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// JSON file listing the site's pages and portfolio database
    #[arg(long, default_value = "config/pages.json")]
    pub pages_config: PathBuf,

    /// Child listings allowed in flight at one level of a block tree
    #[arg(long, default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    pub concurrency: usize,

    /// Total attempts for a Notion call failing with a reset or timeout
    #[arg(long, default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    pub retry_attempts: u32,

    /// Base delay between attempts, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Seconds a single Notion request may take before it counts as timed out
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// One page listed on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Contents of the pages file.
#[derive(Debug, Clone, PartialEq)]
pub struct PagesConfig {
    /// Database (or page holding one) the portfolio is read from.
    pub database_id: Option<String>,
    pub pages: Vec<PageEntry>,
}

/// The pages file is either an object or, in its older form, a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum PagesFile {
    Site {
        #[serde(rename = "databaseId", default)]
        database_id: Option<String>,
        #[serde(default)]
        pages: Vec<PageEntry>,
    },
    List(Vec<PageEntry>),
}

impl PagesConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            PagesFile::Site { database_id, pages } => Self {
                database_id: database_id.filter(|id| !id.trim().is_empty()),
                pages,
            },
            PagesFile::List(pages) => Self {
                database_id: None,
                pages,
            },
        })
    }

    pub fn read(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|source| AppError::JsonParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, falling back to the built-in page list when the file is
    /// missing or invalid.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => {
                log::info!(
                    "Loaded {} page(s) from {}",
                    config.pages.len(),
                    path.display()
                );
                config
            }
            Err(e) => {
                log::error!(
                    "Could not read pages config {}: {}. Using the default page list",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            database_id: None,
            pages: vec![PageEntry {
                id: "2d974318f7ec8063ab63ecd5a7ecddbe".to_string(),
                title: "HOVER web".to_string(),
                description: "新媒体艺术项目".to_string(),
            }],
        }
    }
}

/// Resolved site configuration, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub bind: SocketAddr,
    /// Absent when no token is configured; upstream endpoints then fail.
    pub api_key: Option<ApiKey>,
    pub proxy: Option<ValidatedUrl>,
    pub pages: PagesConfig,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub concurrency: usize,
    pub verbose: bool,
}

impl SiteConfig {
    /// Resolves the configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    /// Like [`SiteConfig::resolve`], reading variables through `env`.
    pub fn resolve_with(
        cli: CommandLineInput,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let api_key = match first_set(&env, &TOKEN_VARS) {
            Some(token) => Some(ApiKey::new(token)?),
            None => {
                log::warn!(
                    "Neither {} nor {} is set; Notion endpoints will fail",
                    TOKEN_VARS[0],
                    TOKEN_VARS[1]
                );
                None
            }
        };

        let proxy = first_set(&env, &PROXY_VARS).and_then(|url| {
            ValidatedUrl::parse(&url)
                .map_err(|e| log::error!("Ignoring proxy setting: {}", e))
                .ok()
        });

        Ok(Self {
            bind: cli.bind,
            api_key,
            proxy,
            pages: PagesConfig::load(&cli.pages_config),
            retry: RetryPolicy::new(
                cli.retry_attempts,
                Duration::from_millis(cli.retry_delay_ms),
            ),
            request_timeout: Duration::from_secs(cli.request_timeout_secs.max(1)),
            concurrency: cli.concurrency.max(1),
            verbose: cli.verbose,
        })
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_key: None,
            proxy: None,
            pages: PagesConfig::default(),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            verbose: false,
        }
    }
}

fn first_set(env: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env(name))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn cli(args: &[&str]) -> CommandLineInput {
        let mut argv = vec!["notion-site"];
        argv.extend_from_slice(args);
        CommandLineInput::parse_from(argv)
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_cli_defaults() {
        let input = cli(&[]);
        assert_eq!(input.bind, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(input.pages_config, PathBuf::from("config/pages.json"));
        assert_eq!(input.concurrency, 5);
        assert_eq!(input.retry_attempts, 2);
        assert_eq!(input.retry_delay_ms, 500);
        assert_eq!(
            Duration::from_millis(input.retry_delay_ms),
            crate::constants::DEFAULT_RETRY_DELAY
        );
        assert_eq!(input.request_timeout_secs, 60);
        assert!(!input.verbose);
    }

    #[test]
    fn test_token_falls_back_to_api_key_variable() {
        let config = SiteConfig::resolve_with(
            cli(&["--pages-config", "/nonexistent/pages.json"]),
            env(&[("NOTION_API_KEY", "secret_abcdefghijklmnopqrstuvwxyz")]),
        )
        .unwrap();

        assert_eq!(
            config.api_key.unwrap().as_str(),
            "secret_abcdefghijklmnopqrstuvwxyz"
        );
    }

    #[test]
    fn test_missing_token_is_not_fatal() {
        let config = SiteConfig::resolve_with(
            cli(&["--pages-config", "/nonexistent/pages.json"]),
            env(&[]),
        )
        .unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.pages, PagesConfig::default());
    }

    #[test]
    fn test_https_proxy_wins_over_http_proxy() {
        let config = SiteConfig::resolve_with(
            cli(&["--pages-config", "/nonexistent/pages.json"]),
            env(&[
                ("http_proxy", "http://plain.proxy:8080"),
                ("https_proxy", "http://secure.proxy:8443"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.proxy.unwrap().as_str(),
            "http://secure.proxy:8443/"
        );
    }

    #[test]
    fn test_pages_file_object_form() {
        let config = PagesConfig::from_json(
            r#"{
                "databaseId": "2d974318-f7ec-8063-ab63-ecd5a7ecddbe",
                "pages": [{ "id": "abc", "title": "About" }]
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.database_id.as_deref(),
            Some("2d974318-f7ec-8063-ab63-ecd5a7ecddbe")
        );
        assert_eq!(
            config.pages,
            vec![PageEntry {
                id: "abc".to_string(),
                title: "About".to_string(),
                description: String::new(),
            }]
        );
    }

    #[test]
    fn test_pages_file_bare_list_form() {
        let config =
            PagesConfig::from_json(r#"[{ "id": "abc", "title": "A", "description": "d" }]"#)
                .unwrap();
        assert!(config.database_id.is_none());
        assert_eq!(config.pages.len(), 1);
    }

    #[test]
    fn test_unreadable_pages_file_uses_default() {
        let dir = std::env::temp_dir().join(format!("notion-site-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pages.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PagesConfig::read(&path),
            Err(AppError::JsonParseError { .. })
        ));
        let config = PagesConfig::load(&path);
        assert_eq!(config.pages[0].title, "HOVER web");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
