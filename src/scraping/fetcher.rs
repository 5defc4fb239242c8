// Fetcher for the bond listing page
//
// One GET per call, no retry: a failed cycle is simply retried by the next
// scheduled firing.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ScrapeError;

const USER_AGENT: &str = concat!("bondwatch/", env!("CARGO_PKG_VERSION"), " (price sampler)");

/// HTTP client bound to a single listing URL
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    url: String,
}

impl Fetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the page body.
    ///
    /// Fails with [`ScrapeError::Transport`] when the request cannot be
    /// completed and with [`ScrapeError::Status`] on a non-2xx response.
    pub async fn fetch(&self) -> Result<String> {
        info!("Fetching bond listing from: {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| ScrapeError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: self.url.clone(),
                status,
            }
            .into());
        }

        let body = resp.text().await.map_err(|source| ScrapeError::Transport {
            url: self.url.clone(),
            source,
        })?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);

        Ok(body)
    }
}
