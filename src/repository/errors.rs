use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    /// 4xx answer carrying the backend's own explanation.
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RepositoryError::Timeout(err.to_string())
        } else if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::from_status(status, &[])
        } else {
            RepositoryError::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for RepositoryError {
    fn from(err: url::ParseError) -> Self {
        RepositoryError::ValidationError(format!("Invalid backend url: {err}"))
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::Decode(err.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: Option<String>,
}

impl RepositoryError {
    /// Maps a non-success status and its body to an error.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| body_preview(body, status));

        match status {
            StatusCode::NOT_FOUND => RepositoryError::NotFound,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                RepositoryError::Timeout(message)
            }
            _ if status.is_client_error() => RepositoryError::Rejected(message),
            _ => RepositoryError::Backend(message),
        }
    }
}

fn body_preview(body: &[u8], status: StatusCode) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
    }
}
