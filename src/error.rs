// src/error.rs
//! Application error types with structured error handling.
//!
//! Every failure the service can report is a variant here. The HTTP layer
//! only needs the classifications at the bottom of this file: not found,
//! transient network failure, or neither.

use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    RateLimited,
    /// The object does not exist or is not shared with the integration
    ObjectNotFound,
    Unauthorized,
    RestrictedResource,
    InvalidJson,
    /// Request parameters failed Notion's validation, e.g. a page id used
    /// where a database id is expected
    ValidationFailed,
    Conflict,
    InternalError,
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound | Self::HttpStatus(404))
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Load was aborted")]
    Aborted,

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),

    #[error(transparent)]
    NotionClient(#[from] NotionClientError),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError {
            message: err.to_string(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Failures while talking to Notion or decoding what it sent back.
#[derive(Error, Debug)]
pub enum NotionClientError {
    #[error("Failed to deserialize response: {source}\nBody: {body}")]
    Deserialization {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("HTTP transport error: {message}")]
    Transport { message: String },

    #[error("Type conversion error: {message}")]
    ConversionError { message: String },
}

/// Code for server errors that fit no narrower classification.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

/// The network conditions worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientFailure {
    ConnectionReset,
    TimedOut,
}

impl TransientFailure {
    /// Stable machine-readable code reported to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConnectionReset => "ECONNRESET",
            Self::TimedOut => "ETIMEDOUT",
        }
    }

    /// Classifies an error message by the substrings sockets and HTTP
    /// stacks use for resets and timeouts.
    pub fn from_message(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        if lower.contains("econnreset") || lower.contains("connection reset") {
            Some(Self::ConnectionReset)
        } else if lower.contains("etimedout")
            || lower.contains("timeout")
            || lower.contains("timed out")
        {
            Some(Self::TimedOut)
        } else {
            None
        }
    }
}

impl fmt::Display for TransientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl AppError {
    /// Whether Notion reported that the object does not exist or is not
    /// shared with the integration.
    pub fn is_not_found(&self) -> bool {
        match self {
            AppError::NotFound(_) => true,
            AppError::NotionService { code, status, .. } => {
                code.is_not_found() || *status == reqwest::StatusCode::NOT_FOUND
            }
            _ => false,
        }
    }

    /// Whether Notion rejected the request parameters.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            AppError::NotionService {
                code: NotionErrorCode::ValidationFailed,
                ..
            }
        )
    }

    /// Classifies connection resets and timeouts; everything else is final.
    pub fn transient_failure(&self) -> Option<TransientFailure> {
        match self {
            AppError::NetworkFailure(err) => {
                if err.is_timeout() {
                    Some(TransientFailure::TimedOut)
                } else if err.is_connect() {
                    Some(TransientFailure::ConnectionReset)
                } else {
                    TransientFailure::from_message(&error_chain(err))
                }
            }
            AppError::NotionClient(NotionClientError::Transport { message }) => {
                TransientFailure::from_message(message)
            }
            AppError::Io(err) => TransientFailure::from_message(&err.to_string()),
            _ => None,
        }
    }

    /// HTTP status reported to clients of this service.
    pub fn status_code(&self) -> reqwest::StatusCode {
        use reqwest::StatusCode;

        if self.transient_failure().is_some() {
            StatusCode::SERVICE_UNAVAILABLE
        } else if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            match self {
                AppError::InvalidRequest(_) | AppError::ValidationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    /// Machine-readable code sent alongside the message. Client errors
    /// carry none; unclassified server errors report `UNKNOWN`.
    pub fn error_code(&self) -> Option<String> {
        if let Some(failure) = self.transient_failure() {
            return Some(failure.code().to_string());
        }
        match self {
            AppError::NotionService { code, .. } => Some(code.to_string()),
            _ if self.status_code().is_server_error() => Some(UNKNOWN_ERROR_CODE.to_string()),
            _ => None,
        }
    }
}

/// Joins an error with all of its sources; reqwest keeps the OS-level
/// cause (the part naming the reset or timeout) in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(message: &str) -> AppError {
        AppError::NotionClient(NotionClientError::Transport {
            message: message.to_string(),
        })
    }

    #[test]
    fn test_transient_classification_by_message() {
        assert_eq!(
            transport("read ECONNRESET").transient_failure(),
            Some(TransientFailure::ConnectionReset)
        );
        assert_eq!(
            transport("Connection reset by peer").transient_failure(),
            Some(TransientFailure::ConnectionReset)
        );
        assert_eq!(
            transport("connect ETIMEDOUT 10.0.0.1:443").transient_failure(),
            Some(TransientFailure::TimedOut)
        );
        assert_eq!(
            transport("operation timed out").transient_failure(),
            Some(TransientFailure::TimedOut)
        );
        assert_eq!(transport("certificate unknown").transient_failure(), None);
    }

    #[test]
    fn test_service_errors_are_not_transient() {
        let err = AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: "Could not find page".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(err.transient_failure().is_none());
        assert!(err.is_not_found());
    }

    #[test]
    fn test_not_found_from_bare_status() {
        let err = AppError::NotionService {
            code: NotionErrorCode::from_http_status(404),
            message: "HTTP 404".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(err.is_not_found());
        assert!(!err.is_validation_failure());
    }

    #[test]
    fn test_error_code_round_trip_through_display() {
        for code in ["object_not_found", "validation_error", "rate_limited"] {
            assert_eq!(NotionErrorCode::from_api_response(code).to_string(), code);
        }
        assert_eq!(
            NotionErrorCode::from_api_response("new_code"),
            NotionErrorCode::Unknown("new_code".to_string())
        );
    }

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;

        let reset = transport("socket hang up: ECONNRESET");
        assert_eq!(reset.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(reset.error_code().as_deref(), Some("ECONNRESET"));

        let missing = AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: "Could not find page".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.error_code().as_deref(), Some("object_not_found"));

        let bad_id = AppError::InvalidRequest("missing id".to_string());
        assert_eq!(bad_id.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(bad_id.error_code(), None);

        let config = AppError::MissingConfiguration("NOTION_API_TOKEN".to_string());
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(config.error_code().as_deref(), Some("UNKNOWN"));

        let garbled = AppError::MalformedResponse("expected value at line 1".to_string());
        assert_eq!(garbled.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(garbled.error_code().as_deref(), Some(UNKNOWN_ERROR_CODE));
    }
}
