use thiserror::Error;

#[derive(Error, Debug)]
pub enum PracticeError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Scraping failed: {0}")]
    Scrape(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Wrong key for the user registry")]
    Unauthorized,

    #[error("There is no user with id={0}")]
    UnknownUser(i64),

    #[error("Morphology analyzer is not configured")]
    MorphologyUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PracticeError>;

/// Failure of a single outbound fetch made by a translation service.
///
/// These never leave the aggregator: every variant becomes "no result".
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("service error: {0}")]
    Api(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
