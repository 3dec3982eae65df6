//! HTTP client for public coding-platform statistics endpoints.

use std::time::Duration;

use reqwest::Client;

use crate::error::StatsError;

/// Thin wrapper over `reqwest` that performs a single unauthenticated GET and
/// returns the body as untyped JSON.
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
}

impl StatsClient {
    /// Creates a client with the given timeouts and `User-Agent`.
    ///
    /// `timeout_secs = 0` leaves the total request time unbounded; the connect
    /// timeout always applies.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        connect_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StatsError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .user_agent(user_agent);
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_config(config: &folio_core::AppConfig) -> Result<Self, StatsError> {
        Self::new(
            config.stats_request_timeout_secs,
            config.stats_connect_timeout_secs,
            &config.stats_user_agent,
        )
    }

    /// Sends one GET request and parses a 2xx body as JSON. Never retries.
    ///
    /// # Errors
    ///
    /// - [`StatsError::UnexpectedStatus`] for any non-2xx status.
    /// - [`StatsError::Http`] on network failure or timeout.
    /// - [`StatsError::Deserialize`] if the body is not valid JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, StatsError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| StatsError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
