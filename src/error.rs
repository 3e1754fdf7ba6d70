//! Error types for ryt

use thiserror::Error;

/// Main error type for ryt operations.
///
/// Mirrors the error kinds a caller needs to branch on: a failed identifier
/// resolution, a transport failure, drift in one of the scraped blobs, a
/// playability rejection from YouTube itself, a signature program that
/// couldn't be derived, a malformed format, or an explicit cancellation.
#[derive(Debug, Error)]
pub enum RytError {
    #[error("invalid youtube URL, no video id")]
    InvalidIdentifier,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("unavailable because: {0}")]
    Playability(String),

    #[error("unable to extract signature tokens: {0}")]
    Signature(String),

    #[error("couldn't extract url from format")]
    UrlBuild,

    #[error("operation cancelled")]
    Cancelled,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("url parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::DeError),
}

impl RytError {
    /// Whether retrying the same request might plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RytError::Network(_) => true,
            RytError::UnexpectedStatus(status) => *status >= 500,
            _ => false,
        }
    }

    /// Whether this error originates from YouTube's own response rather than
    /// a local or transport fault.
    pub fn is_youtube_error(&self) -> bool {
        matches!(self, RytError::Playability(_) | RytError::Signature(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            format!("{}", RytError::InvalidIdentifier),
            "invalid youtube URL, no video id"
        );
        assert_eq!(
            format!("{}", RytError::UnexpectedStatus(404)),
            "unexpected status code: 404"
        );
        assert_eq!(
            format!("{}", RytError::Playability("Video unavailable".into())),
            "unavailable because: Video unavailable"
        );
        assert_eq!(
            format!("{}", RytError::Signature("no helper object".into())),
            "unable to extract signature tokens: no helper object"
        );
        assert_eq!(format!("{}", RytError::UrlBuild), "couldn't extract url from format");
        assert_eq!(format!("{}", RytError::Cancelled), "operation cancelled");
    }

    #[test]
    fn test_is_retryable() {
        assert!(RytError::UnexpectedStatus(503).is_retryable());
        assert!(!RytError::UnexpectedStatus(404).is_retryable());
        assert!(!RytError::InvalidIdentifier.is_retryable());
        assert!(!RytError::Cancelled.is_retryable());
    }

    #[test]
    fn test_is_youtube_error() {
        assert!(RytError::Playability("fail".into()).is_youtube_error());
        assert!(RytError::Signature("fail".into()).is_youtube_error());
        assert!(!RytError::InvalidIdentifier.is_youtube_error());
        assert!(!RytError::UnexpectedStatus(500).is_youtube_error());
    }
}
