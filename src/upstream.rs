//! Open-Meteo forecast client used by the proxy
//!
//! Builds the single outbound request the proxy makes per incoming request
//! and classifies the outcome. The response body is handed back untouched so
//! the proxy can relay it verbatim.

use std::time::Duration;

use reqwest::Client;
use serde::de::IgnoredAny;
use thiserror::Error;
use tracing::debug;

use crate::data::Location;

/// Base URL for the Open-Meteo forecast API
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Default timeout for one upstream request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hourly variables requested from the provider
pub const HOURLY_FIELDS: [&str; 3] = ["temperature_2m", "precipitation", "wind_speed_10m"];

/// Current-conditions variables requested from the provider
pub const CURRENT_FIELDS: [&str; 7] = [
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "weather_code",
    "wind_speed_10m",
    "wind_direction_10m",
];

/// Errors that can occur when fetching from the provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Provider answered with a non-2xx status
    #[error("Upstream responded with HTTP {status}")]
    Status { status: u16, details: String },

    /// No response at all (connect failure, timeout, broken body)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered 2xx with something that is not JSON
    #[error("Upstream returned invalid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Client for the external forecast provider
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Creates a client for Open-Meteo with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different forecast endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for a location
    ///
    /// Numbers use Rust's shortest round-trip formatting, so `13.7563` is sent
    /// as `13.7563`.
    pub fn forecast_query(location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.latitude().to_string()),
            ("longitude", location.longitude().to_string()),
            ("timezone", location.time_zone().to_string()),
            ("hourly", HOURLY_FIELDS.join(",")),
            ("current", CURRENT_FIELDS.join(",")),
        ]
    }

    /// Fetches the forecast document for a location
    ///
    /// # Returns
    /// * `Ok(String)` - The provider's JSON body, byte for byte
    /// * `Err(UpstreamError::Status)` - Non-2xx, with the provider's raw body
    /// * `Err(UpstreamError::Network)` - The request did not complete
    /// * `Err(UpstreamError::InvalidBody)` - 2xx but not a JSON document
    pub async fn fetch_forecast(&self, location: &Location) -> Result<String, UpstreamError> {
        debug!(url = %self.base_url, lat = location.latitude(), lon = location.longitude(), "requesting forecast");

        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::forecast_query(location))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                details: body,
            });
        }

        serde_json::from_str::<IgnoredAny>(&body)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FORECAST_BODY: &str = r#"{"latitude":13.75,"current":{"temperature_2m":31.2},"hourly":{"time":["2024-07-15T00:00"],"temperature_2m":[27.1]}}"#;

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(format!("{}/v1/forecast", server.uri()))
    }

    #[test]
    fn test_forecast_query_for_default_location() {
        let query = UpstreamClient::forecast_query(&Location::default());
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("latitude"), Some("13.7563"));
        assert_eq!(get("longitude"), Some("100.5018"));
        assert_eq!(get("timezone"), Some("Asia/Bangkok"));
        assert_eq!(get("hourly"), Some("temperature_2m,precipitation,wind_speed_10m"));
        assert_eq!(
            get("current"),
            Some("temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m,wind_direction_10m")
        );
    }

    #[test]
    fn test_default_base_url() {
        let client = UpstreamClient::new(DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), OPEN_METEO_BASE_URL);
    }

    #[tokio::test]
    async fn test_fetch_forecast_returns_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "35.6762"))
            .and(query_param("longitude", "139.6503"))
            .and(query_param("timezone", "Asia/Tokyo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let location = Location::new(35.6762, 139.6503, "Asia/Tokyo").unwrap();
        let body = client_for(&server).fetch_forecast(&location).await.unwrap();

        assert_eq!(body, FORECAST_BODY);
    }

    #[tokio::test]
    async fn test_fetch_forecast_keeps_upstream_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_forecast(&Location::default())
            .await
            .unwrap_err();

        match err {
            UpstreamError::Status { status, details } => {
                assert_eq!(status, 503);
                assert_eq!(details, "rate limited");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_forecast_rejects_non_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_forecast(&Location::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_network_failure() {
        // Bind then drop a listener so the port is closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = UpstreamClient::new(Duration::from_secs(2))
            .unwrap()
            .with_base_url(format!("http://127.0.0.1:{port}/v1/forecast"));

        let err = client.fetch_forecast(&Location::default()).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Network(_)));
    }
}
