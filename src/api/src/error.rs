//! Error types for page loading and field extraction.

use thiserror::Error;

/// Failure while loading or extracting a race or horse page
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{url} responded with {status} {reason}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to parse document from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("could not extract {field}: {reason}")]
    Extraction { field: &'static str, reason: String },

    #[error("result row {row} is malformed: {source}")]
    MalformedRow {
        row: usize,
        #[source]
        source: RowError,
    },
}

impl ScrapeError {
    pub(crate) fn extraction(field: &'static str, reason: impl Into<String>) -> Self {
        ScrapeError::Extraction {
            field,
            reason: reason.into(),
        }
    }

    /// True for network failures, bad status codes and unusable URLs.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport { .. }
                | ScrapeError::HttpStatus { .. }
                | ScrapeError::InvalidUrl { .. }
        )
    }
}

/// Failure converting a single past-result row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("bad date {0:?}, expected YYYY/MM/DD")]
    Date(String),

    #[error("bad finish position {0:?}")]
    FinishPosition(String),

    #[error("no distance in course token {0:?}")]
    Distance(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transport() {
        let status = ScrapeError::HttpStatus {
            url: "https://example.com".to_string(),
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert!(status.is_transport());
        assert!(!ScrapeError::extraction("name", "missing").is_transport());
    }

    #[test]
    fn test_display() {
        let err = ScrapeError::MalformedRow {
            row: 2,
            source: RowError::Date("2022-01-01".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "result row 2 is malformed: bad date \"2022-01-01\", expected YYYY/MM/DD"
        );
    }
}
