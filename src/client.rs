//! Dashboard-side client for the forecast proxy

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::data::{ForecastPayload, Location};
use crate::proxy::FORECAST_PATH;

/// Proxy address used when nothing else is configured
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when fetching through the proxy
#[derive(Debug, Error)]
pub enum ClientError {
    /// The proxy answered with a non-2xx status
    #[error("HTTP {status}: {details}")]
    Upstream { status: u16, details: String },

    /// No response arrived
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response was not a forecast document
    #[error("Failed to parse forecast: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the proxy's forecast endpoint
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_URL)
    }
}

impl ForecastClient {
    /// Creates a client for the proxy at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Full URL of the forecast endpoint
    pub fn forecast_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FORECAST_PATH)
    }

    /// Fetches the forecast for a location
    ///
    /// # Returns
    /// * `Ok(ForecastPayload)` - The relayed forecast, possibly without blocks
    /// * `Err(ClientError)` - If the proxy failed, was unreachable, or sent garbage
    pub async fn fetch(&self, location: &Location) -> Result<ForecastPayload, ClientError> {
        let response = self
            .client
            .get(self.forecast_url())
            .query(&[
                ("lat", location.latitude().to_string()),
                ("lon", location.longitude().to_string()),
                ("tz", location.time_zone().to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                details: error_details(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pulls the most useful message out of a proxy error body
///
/// Prefers the relayed provider `details`, then the proxy's own `message`,
/// then the raw body.
fn error_details(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("details").or_else(|| v.get("message")))
        .map(|v| match v.as_str() {
            Some(text) => text.to_string(),
            None => v.to_string(),
        })
        .unwrap_or_else(|| body.trim().to_string())
}
