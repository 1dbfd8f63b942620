//! Error types for remote catalog operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for remote catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Longest remote error body kept on a [`CatalogError::Remote`].
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// Errors returned by the remote catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("Remote API returned {status}: {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response body.
        body: String,
    },

    /// A success response could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client was constructed with unusable settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Build a [`CatalogError::Remote`] from a failed response.
    pub fn remote(status: StatusCode, body: &str) -> Self {
        Self::Remote {
            status: status.as_u16(),
            body: summarize_error_body(body),
        }
    }

    /// The HTTP status, if the remote API answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the item does not exist (already deleted or never existed).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Reduce an error response body to its diagnostic core.
///
/// JSON bodies yield their `errors` (or `error`) member, falling back to the
/// whole document; anything else is kept as text. The result is truncated.
fn summarize_error_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "<empty body>".to_string();
    }

    let summary = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => {
            let detail = json.get("errors").or_else(|| json.get("error")).unwrap_or(&json);
            match detail {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        }
        Err(_) => body.to_string(),
    };

    if summary.chars().count() > MAX_ERROR_BODY_CHARS {
        let mut truncated: String = summary.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        summary
    }
}
