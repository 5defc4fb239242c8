//! Error handling for bondwatch
//!
//! Defines the failure taxonomy of a scrape cycle and establishes a unified
//! Result type using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for the scrape pipeline
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("markup error: {0}")]
    Markup(String),

    #[error("storage error")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for bondwatch operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = ScrapeError::Markup("no table rows".to_string());
        assert_eq!(err.to_string(), "markup error: no table rows");
    }

    #[test]
    fn test_status_error_names_url_and_code() {
        let err = ScrapeError::Status {
            url: "https://example.test/ukrbonds".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.test/ukrbonds"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn test_anyhow_context_keeps_scrape_error_downcastable() {
        use anyhow::Context;
        let result: Result<()> = Err(ScrapeError::Config("bad port".to_string()))
            .context("failed to load configuration");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to load configuration"));
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::Config(_))
        ));
    }
}
