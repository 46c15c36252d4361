use rmcp::model::{ErrorCode, ErrorData};
use serde_json::json;

/// All error types produced by the statgate-mcp server.
#[derive(Debug, thiserror::Error)]
pub enum StatGateError {
    #[error("Invalid pagination: {0}")]
    Pagination(String),

    #[error(
        "Unknown field(s): {}. Valid fields: {}",
        .unknown.join(", "),
        .valid.join(", ")
    )]
    FieldSelection {
        unknown: Vec<String>,
        valid: Vec<String>,
    },

    #[error(
        "Response too large: ~{estimated_tokens} tokens exceeds the limit of {max_tokens}. {}",
        .suggestions.join(" ")
    )]
    TokenLimit {
        estimated_tokens: usize,
        max_tokens: usize,
        suggestions: Vec<String>,
    },

    #[error("Endpoint not allowed: {endpoint}")]
    EndpointNotAllowed {
        endpoint: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Authentication failed — check STATGATE_API_TOKEN")]
    Auth,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StatGateError {
    /// True for errors the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Pagination(_)
                | Self::FieldSelection { .. }
                | Self::TokenLimit { .. }
                | Self::EndpointNotAllowed { .. }
                | Self::InvalidFilter(_)
        )
    }
}

impl From<StatGateError> for ErrorData {
    fn from(err: StatGateError) -> Self {
        let data = match &err {
            StatGateError::FieldSelection { unknown, valid } => Some(json!({
                "kind": "field_selection",
                "invalid_fields": unknown,
                "valid_fields": valid,
            })),
            StatGateError::TokenLimit {
                estimated_tokens,
                max_tokens,
                suggestions,
            } => Some(json!({
                "kind": "token_limit",
                "estimated_tokens": estimated_tokens,
                "max_tokens": max_tokens,
                "suggestions": suggestions,
            })),
            StatGateError::EndpointNotAllowed { allowed, .. } => Some(json!({
                "kind": "endpoint_not_allowed",
                "allowed_endpoints": allowed,
            })),
            StatGateError::Pagination(_) => Some(json!({ "kind": "pagination" })),
            _ => None,
        };
        let code = match &err {
            e if e.is_client_error() => ErrorCode::INVALID_PARAMS,
            StatGateError::NotFound(_) => ErrorCode::INVALID_PARAMS,
            StatGateError::Auth => ErrorCode::INVALID_PARAMS,
            _ => ErrorCode::INTERNAL_ERROR,
        };
        ErrorData::new(code, err.to_string(), data)
    }
}

pub type Result<T> = std::result::Result<T, StatGateError>;
