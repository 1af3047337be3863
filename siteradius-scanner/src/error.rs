use thiserror::Error;

/// Errors that stop a crawl before it starts.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a single URL contributed nothing to the crawl.
///
/// These never escape the dispatcher as errors; they are carried as values
/// in [`crate::result::FetchOutcome::Failed`] and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not an HTML document (content-type: {})", .0.as_deref().unwrap_or("none"))]
    NotHtml(Option<String>),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("content too short ({0} chars)")]
    ContentTooShort(usize),
}

impl FetchFailure {
    pub(crate) fn from_request(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Transport(error.to_string())
        }
    }

    pub(crate) fn from_body(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Body(error.to_string())
        }
    }
}
