//! Core data models for Skyglance
//!
//! This module contains the location model and the forecast payload as the
//! Open-Meteo provider returns it. Decoding is lenient: a well-formed JSON
//! document always decodes, and anything missing or of the wrong shape
//! surfaces as "unknown" instead of failing the whole payload.

pub mod chart;
pub mod present;
pub mod presets;
pub mod window;

pub use presets::{all_presets, CityPreset};
pub use window::{build_window, DEFAULT_WINDOW_SIZE};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Latitude used when a request does not name one (Bangkok)
pub const DEFAULT_LATITUDE: f64 = 13.7563;
/// Longitude used when a request does not name one (Bangkok)
pub const DEFAULT_LONGITUDE: f64 = 100.5018;
/// Time zone used when a request does not name one
pub const DEFAULT_TIME_ZONE: &str = "Asia/Bangkok";

/// Errors raised when building a [`Location`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Time zone must not be empty")]
    EmptyTimeZone,

    #[error("Invalid coordinate '{0}'")]
    InvalidNumber(String),

    #[error("Expected 'lat,lon,tz', got '{0}'")]
    MalformedEntry(String),
}

/// A point on the map plus the IANA time zone forecasts are requested in
///
/// Locations are only built through [`Location::new`] (or a preset), so the
/// coordinate ranges always hold. A change of location replaces the whole
/// value; nothing mutates a location in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    time_zone: String,
    /// Display name (preset city name, or `None` for manual coordinates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Location {
    /// Creates a validated location
    ///
    /// The time zone is not checked against the IANA database, only for being
    /// non-empty.
    pub fn new(
        latitude: f64,
        longitude: f64,
        time_zone: impl Into<String>,
    ) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::LongitudeOutOfRange(longitude));
        }
        let time_zone = time_zone.into().trim().to_string();
        if time_zone.is_empty() {
            return Err(LocationError::EmptyTimeZone);
        }

        Ok(Self {
            latitude,
            longitude,
            time_zone,
            label: None,
        })
    }

    /// Parses a manual entry of the form `lat,lon,tz`
    pub fn parse_manual(input: &str) -> Result<Self, LocationError> {
        let mut parts = input.splitn(3, ',').map(str::trim);
        let (Some(lat), Some(lon), Some(tz)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(LocationError::MalformedEntry(input.trim().to_string()));
        };

        Self::new(parse_coordinate(lat)?, parse_coordinate(lon)?, tz)
    }

    /// Attaches a display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label if one is set, otherwise the formatted coordinates
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            label: None,
        }
    }
}

/// Parses one coordinate of a manual entry or query parameter
pub fn parse_coordinate(raw: &str) -> Result<f64, LocationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LocationError::InvalidNumber(raw.to_string()))
}

/// Current conditions block of the forecast payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    /// Air temperature in °C
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature_2m: Option<f64>,
    /// Relative humidity in %
    #[serde(default, deserialize_with = "lenient_f64")]
    pub relative_humidity_2m: Option<f64>,
    /// Feels-like temperature in °C
    #[serde(default, deserialize_with = "lenient_f64")]
    pub apparent_temperature: Option<f64>,
    /// Precipitation in mm
    #[serde(default, deserialize_with = "lenient_f64")]
    pub precipitation: Option<f64>,
    /// WMO weather code
    #[serde(default, deserialize_with = "lenient_code")]
    pub weather_code: Option<i64>,
    /// Wind speed in km/h
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_speed_10m: Option<f64>,
    /// Wind direction in degrees
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_direction_10m: Option<f64>,
}

/// Hourly block of the forecast payload: parallel arrays indexed by hour
///
/// A value array is `None` when the provider left it out (or sent something
/// that is not an array); individual entries are `None` when null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default, deserialize_with = "lenient_times")]
    pub time: Vec<Option<String>>,
    #[serde(default, deserialize_with = "lenient_values")]
    pub temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default, deserialize_with = "lenient_values")]
    pub precipitation: Option<Vec<Option<f64>>>,
    #[serde(default, deserialize_with = "lenient_values")]
    pub wind_speed_10m: Option<Vec<Option<f64>>>,
}

impl HourlySeries {
    /// Number of hours the parallel arrays can be merged over
    ///
    /// Bounded by `time` and by every value array that is present.
    pub fn len(&self) -> usize {
        [
            self.temperature_2m.as_ref(),
            self.precipitation.as_ref(),
            self.wind_speed_10m.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(Vec::len)
        .fold(self.time.len(), usize::min)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One upcoming hour, zipped out of [`HourlySeries`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyReading {
    /// Timestamp as the provider sent it (empty when missing)
    pub time: String,
    /// Parsed wall-clock timestamp, `None` when unparseable
    pub timestamp: Option<NaiveDateTime>,
    /// Temperature in °C, `None` when unknown
    pub temperature_c: Option<f64>,
    /// Precipitation in mm, missing values count as 0
    pub precipitation_mm: f64,
    /// Wind speed in km/h, `None` when unknown
    pub wind_speed_kmh: Option<f64>,
}

/// Forecast document relayed by the proxy
///
/// Fetched fresh per location change and replaced, never merged, by the next
/// fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default, deserialize_with = "lenient_block")]
    pub current: Option<CurrentConditions>,
    #[serde(default, deserialize_with = "lenient_block")]
    pub hourly: Option<HourlySeries>,
    /// Offset of the location's wall clock from UTC
    #[serde(default, deserialize_with = "lenient_code")]
    pub utc_offset_seconds: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timezone: Option<String>,
}

/// Largest wall-clock offset from UTC a location can have
const MAX_UTC_OFFSET_SECONDS: i64 = 18 * 3600;

impl ForecastPayload {
    /// Expresses `now` in the location's wall-clock time
    ///
    /// Hourly timestamps carry no offset, so they can only be compared with a
    /// "now" shifted by the payload's `utc_offset_seconds`.
    /// Offsets beyond ±18 h are treated as absent.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        let utc = now.naive_utc();
        self.utc_offset_seconds
            .filter(|seconds| (-MAX_UTC_OFFSET_SECONDS..=MAX_UTC_OFFSET_SECONDS).contains(seconds))
            .and_then(Duration::try_seconds)
            .and_then(|offset| utc.checked_add_signed(offset))
            .unwrap_or(utc)
    }

    /// True when the provider sent neither a current nor an hourly block
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.hourly.as_ref().map_or(true, HourlySeries::is_empty)
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn lenient_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    }))
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(str::to_owned))
}

fn lenient_times<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Option<String>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_values<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Option<f64>>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(items.iter().map(Value::as_f64).collect()),
        _ => None,
    })
}

fn lenient_block<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}
