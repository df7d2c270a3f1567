//! Forecast window: the bounded run of upcoming hours shown on screen
//!
//! The provider returns a series that usually starts at local midnight, so
//! most of it is in the past by the time it is displayed. [`build_window`]
//! finds the first hour at or after "now" and keeps at most `window_size`
//! readings from there.

use chrono::{DateTime, NaiveDateTime};

use super::{HourlyReading, HourlySeries};

/// Number of hours shown when nothing else is configured
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Timestamp layouts the provider is known to send
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parses an hourly timestamp into wall-clock time
///
/// Accepts the provider's offset-less ISO 8601 forms, and RFC 3339 with the
/// offset dropped.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Zips the parallel arrays into readings, up to [`HourlySeries::len`]
///
/// Missing precipitation counts as 0 mm. Missing temperature and wind stay
/// unknown.
pub fn zip_readings(series: &HourlySeries) -> Vec<HourlyReading> {
    (0..series.len())
        .map(|i| {
            let time = series.time[i].clone().unwrap_or_default();
            HourlyReading {
                timestamp: parse_timestamp(&time),
                time,
                temperature_c: value_at(series.temperature_2m.as_deref(), i),
                precipitation_mm: value_at(series.precipitation.as_deref(), i).unwrap_or(0.0),
                wind_speed_kmh: value_at(series.wind_speed_10m.as_deref(), i),
            }
        })
        .collect()
}

fn value_at(values: Option<&[Option<f64>]>, index: usize) -> Option<f64> {
    values.and_then(|v| v.get(index).copied().flatten())
}

/// Builds the window of upcoming hours to display
///
/// `now` must be expressed in the same wall-clock time as the series (see
/// [`super::ForecastPayload::local_now`]). The window starts at the first
/// reading whose timestamp is at or after `now`; when there is none it starts
/// at the first reading, so a clock disagreement still shows data rather than
/// an empty table. Never pads, never fails.
pub fn build_window(
    series: Option<&HourlySeries>,
    now: NaiveDateTime,
    window_size: usize,
) -> Vec<HourlyReading> {
    let Some(series) = series else {
        return Vec::new();
    };

    let readings = zip_readings(series);
    let start = readings
        .iter()
        .position(|reading| matches!(reading.timestamp, Some(t) if t >= now))
        .unwrap_or(0);

    readings
        .into_iter()
        .skip(start)
        .take(window_size)
        .collect()
}
