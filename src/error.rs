use thiserror::Error;

use crate::navigation::Navigation;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend rejected the credential; identity state has already been cleared.
    #[error("Unauthorized{}", detail_suffix(.detail))]
    Unauthorized { detail: Option<String> },

    #[error("Backend error: {status} - {}", status_text(.status, .detail))]
    Status { status: u16, detail: Option<String> },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default()
}

/// The backend's detail, or the status line's reason phrase when it sent none.
fn status_text<'a>(status: &u16, detail: &'a Option<String>) -> &'a str {
    match detail {
        Some(detail) => detail,
        None => reqwest::StatusCode::from_u16(*status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status"),
    }
}

impl ApiError {
    /// Where the UI should go as a consequence of this error, if anywhere.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            ApiError::Unauthorized { .. } => Some(Navigation::Login),
            _ => None,
        }
    }

    /// The backend's human-readable `detail`, when the response carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Status { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
