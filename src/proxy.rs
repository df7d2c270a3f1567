//! Forecast proxy HTTP server
//!
//! Exposes `GET /api/weather?lat=&lon=&tz=`, forwards the location to the
//! provider through [`UpstreamClient`] and relays the answer. Successful
//! answers are marked cacheable for 10 minutes with a 1 minute
//! stale-while-revalidate grace; failures keep the provider's status and body.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::data::{
    parse_coordinate, Location, LocationError, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
    DEFAULT_TIME_ZONE,
};
use crate::upstream::{UpstreamClient, UpstreamError, OPEN_METEO_BASE_URL};

/// Cache directive attached to every successful forecast response
pub const CACHE_CONTROL_VALUE: &str = "s-maxage=600, stale-while-revalidate=60";

/// Path of the forecast endpoint
pub const FORECAST_PATH: &str = "/api/weather";

/// Settings for running the proxy
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Address to listen on
    pub bind: SocketAddr,
    /// Forecast endpoint requests are forwarded to
    pub upstream_url: String,
    /// Timeout for each upstream request
    pub timeout: Duration,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream_url: OPEN_METEO_BASE_URL.to_string(),
            timeout: crate::upstream::DEFAULT_TIMEOUT,
        }
    }
}

/// Shared state handed to every request
#[derive(Debug, Clone)]
pub struct ProxyState {
    upstream: UpstreamClient,
}

impl ProxyState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }
}

/// Raw query string of the forecast endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ForecastParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub tz: Option<String>,
}

impl ForecastParams {
    /// Resolves the query into a location, defaulting only what is missing
    pub fn location(&self) -> Result<Location, LocationError> {
        let latitude = match self.lat.as_deref() {
            Some(raw) => parse_coordinate(raw)?,
            None => DEFAULT_LATITUDE,
        };
        let longitude = match self.lon.as_deref() {
            Some(raw) => parse_coordinate(raw)?,
            None => DEFAULT_LONGITUDE,
        };
        let time_zone = self.tz.as_deref().unwrap_or(DEFAULT_TIME_ZONE);

        Location::new(latitude, longitude, time_zone)
    }
}

/// Errors surfaced by the proxy, each mapped to a JSON response
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid location: {0}")]
    BadRequest(#[from] LocationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::BadRequest(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": true, "message": err.to_string() })),
            )
                .into_response(),
            ProxyError::Upstream(UpstreamError::Status { status, details }) => {
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    code,
                    Json(json!({ "error": true, "status": status, "details": details })),
                )
                    .into_response()
            }
            ProxyError::Upstream(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": true, "message": err.to_string() })),
            )
                .into_response(),
        }
    }
}

/// Builds the proxy's routes
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(FORECAST_PATH, get(forecast))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn forecast(
    State(state): State<ProxyState>,
    Query(params): Query<ForecastParams>,
) -> Result<Response, ProxyError> {
    let location = params.location().inspect_err(|err| {
        warn!(?params, error = %err, "rejecting forecast request");
    })?;

    let started = Instant::now();
    let result = state.upstream.fetch_forecast(&location).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(body) => {
            info!(
                lat = location.latitude(),
                lon = location.longitude(),
                tz = location.time_zone(),
                elapsed_ms,
                "forecast relayed"
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (header::CACHE_CONTROL, CACHE_CONTROL_VALUE),
                ],
                body,
            )
                .into_response())
        }
        Err(err) => {
            match &err {
                UpstreamError::Status { status, .. } => {
                    warn!(status, elapsed_ms, tz = location.time_zone(), "upstream rejected forecast request")
                }
                other => warn!(error = %other, elapsed_ms, "forecast request failed"),
            }
            Err(err.into())
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Serves the proxy on an already bound listener until shutdown
pub async fn serve_on(listener: TcpListener, state: ProxyState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Binds the configured address and serves until Ctrl-C
pub async fn serve(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let upstream = UpstreamClient::new(config.timeout)?.with_base_url(config.upstream_url.clone());
    let listener = TcpListener::bind(config.bind).await?;

    info!(
        addr = %listener.local_addr()?,
        upstream = %config.upstream_url,
        "forecast proxy listening"
    );
    serve_on(listener, ProxyState::new(upstream)).await?;
    info!("forecast proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_params_default_to_bangkok() {
        let location = ForecastParams::default().location().unwrap();
        assert_eq!(location, Location::default());
    }

    #[test]
    fn test_each_param_defaults_independently() {
        let params = ForecastParams {
            lat: Some("35.6762".into()),
            lon: None,
            tz: Some("Asia/Tokyo".into()),
        };
        let location = params.location().unwrap();
        assert_eq!(location.latitude(), 35.6762);
        assert_eq!(location.longitude(), DEFAULT_LONGITUDE);
        assert_eq!(location.time_zone(), "Asia/Tokyo");
    }

    #[test]
    fn test_present_but_invalid_params_are_rejected() {
        let bad_number = ForecastParams {
            lat: Some("abc".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad_number.location(),
            Err(LocationError::InvalidNumber(_))
        ));

        let empty = ForecastParams {
            lon: Some(String::new()),
            ..Default::default()
        };
        assert!(empty.location().is_err());

        let out_of_range = ForecastParams {
            lat: Some("-91".into()),
            ..Default::default()
        };
        assert!(matches!(
            out_of_range.location(),
            Err(LocationError::LatitudeOutOfRange(_))
        ));

        let blank_tz = ForecastParams {
            tz: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(blank_tz.location(), Err(LocationError::EmptyTimeZone));
    }

    #[test]
    fn test_serve_config_default() {
        let config = ServeConfig::default();
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.upstream_url, OPEN_METEO_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_upstream_status_maps_to_same_http_status() {
        let response = ProxyError::Upstream(UpstreamError::Status {
            status: 429,
            details: "slow down".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let response = ProxyError::BadRequest(LocationError::EmptyTimeZone).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
