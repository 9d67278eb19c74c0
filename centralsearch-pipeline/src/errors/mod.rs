//! Error types for the replication pipeline.

use centralsearch_repository::SearchIndexError;
use thiserror::Error;

/// Errors raised while fetching a page from a source backend.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// Network failure or timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Source responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured source URL is unusable.
    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid URL error.
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Network errors, timeouts, 5xx, 408 and 429 responses are transient.
    /// Anything else will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport(_) => true,
            SourceError::Status { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            SourceError::Parse(_) | SourceError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors raised by a mapping profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A field the profile depends on is absent or not a scalar.
    #[error("Record has no usable '{field}' field")]
    MissingField { field: String },

    /// A field is present but has an unexpected shape.
    #[error("Field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },
}

impl MappingError {
    /// Create a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid field error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur in the replication pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid settings or an unresolvable profile.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A page could not be fetched, even after retries.
    #[error("Failed to fetch page at offset {offset}: {source}")]
    PageError {
        offset: u64,
        #[source]
        source: SourceError,
    },

    /// A source error outside of page fetching (e.g. client setup).
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// A record could not be mapped.
    #[error("Mapping error: {0}")]
    MappingError(#[from] MappingError),

    /// Error from the destination index.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::Transport("reset".into()).is_transient());
        assert!(SourceError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(SourceError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!SourceError::Status {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!SourceError::parse("bad json").is_transient());
    }

    #[test]
    fn test_page_error_display() {
        let err = PipelineError::PageError {
            offset: 500,
            source: SourceError::Transport("timed out".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch page at offset 500: Transport error: timed out"
        );
    }
}
