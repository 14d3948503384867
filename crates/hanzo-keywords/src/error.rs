//! Error types for keyword extraction and SERP harvesting

use thiserror::Error;

/// Result type for keyword pipeline operations
pub type Result<T> = std::result::Result<T, KeywordError>;

/// Errors that can occur while extracting keywords or harvesting result pages
#[derive(Error, Debug)]
pub enum KeywordError {
    /// Extractor is compiled out or its preconditions are not met
    #[error("Extractor {0} is unavailable")]
    Unavailable(String),

    /// An available extractor failed during a run
    #[error("Extraction failed ({method}): {message}")]
    Extraction { method: String, message: String },

    /// Embedding backend failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Network error while rendering a page
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error response
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Request timed out
    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid page reference
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector in configuration
    #[error("Invalid selector '{0}'")]
    Selector(String),

    /// A result container lacks a required sub-element
    #[error("Missing element '{0}' in result container")]
    MissingElement(String),

    /// Browsing resource could not be acquired
    #[error("Browser error: {0}")]
    Browser(String),

    /// Operator input could not be read
    #[error("Operator input error: {0}")]
    Operator(String),

    /// Configuration could not be parsed or written
    #[error("Config error: {0}")]
    Config(String),

    /// CSV log error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for KeywordError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KeywordError::Network(format!("request timed out: {}", err))
        } else if let Some(status) = err.status() {
            KeywordError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            KeywordError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for KeywordError {
    fn from(err: url::ParseError) -> Self {
        KeywordError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for KeywordError {
    fn from(err: toml::de::Error) -> Self {
        KeywordError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KeywordError {
    fn from(err: toml::ser::Error) -> Self {
        KeywordError::Config(err.to_string())
    }
}

impl From<dialoguer::Error> for KeywordError {
    fn from(err: dialoguer::Error) -> Self {
        KeywordError::Operator(err.to_string())
    }
}
