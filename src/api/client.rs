//! Market summaries HTTP client.

use super::{DataConverter, MarketSource, SummariesResponse};
use crate::config::{ApiConfig, Config};
use crate::error::{Error, Result};
use crate::state::FetchOutcome;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Builder for creating an API client.
pub struct ApiClientBuilder {
    config: Config,
}

impl ApiClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the application configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<ApiClient> {
        ApiClient::new(&self.config)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the market summaries endpoint.
pub struct ApiClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// HTTP client.
    http: reqwest::Client,
    /// Response converter.
    converter: DataConverter,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = normalize_base_url(&config.api)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .user_agent(concat!("crypticker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http,
            converter: DataConverter::new(config)?,
        })
    }

    /// The summaries endpoint URL.
    pub fn summaries_url(&self) -> String {
        format!("{}/markets/summaries", self.base_url)
    }

    /// Fetch and parse all market summaries.
    pub async fn fetch_summaries(&self) -> Result<SummariesResponse> {
        let url = self.summaries_url();
        debug!("Fetching market summaries from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            return Err(Error::network(format!("API returned status {}", status)));
        }

        let body = response.text().await?;
        let summaries: SummariesResponse = serde_json::from_str(&body)?;

        if let Some(allowance) = &summaries.allowance {
            debug!(
                cost = ?allowance.cost,
                remaining = allowance.remaining,
                "Market summaries fetched"
            );
        }

        Ok(summaries)
    }
}

#[async_trait]
impl MarketSource for ApiClient {
    async fn fetch(&self) -> FetchOutcome {
        match self.fetch_summaries().await {
            Ok(summaries) => self.converter.convert(summaries),
            Err(e) if e.is_recoverable() => {
                warn!("Market data fetch failed: {}", e);
                FetchOutcome::from(&e)
            }
            Err(e) => {
                error!("Market data fetch failed: {}", e);
                FetchOutcome::from(&e)
            }
        }
    }
}

fn normalize_base_url(config: &ApiConfig) -> Result<String> {
    let base_url = config.base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::config(format!(
            "Invalid api.base_url: must start with http:// or https://, got: '{}'",
            base_url
        )));
    }

    Ok(base_url)
}
