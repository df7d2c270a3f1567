//! One-shot forecast report
//!
//! Fetches a location once through the proxy and prints the same information
//! the dashboard shows. Optionally writes the temperature and precipitation
//! charts as SVG files.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::cli::{CliError, SnapshotArgs, StartupConfig};
use crate::client::{ClientError, ForecastClient};
use crate::config::Settings;
use crate::data::chart::{
    empty_svg, BarChart, ChartStyle, LineChart, BAR_CHART_HEIGHT, LINE_CHART_HEIGHT,
};
use crate::data::present::{
    format_with_unit, hour_label, map_embed_url, weather_emoji, wind_direction_text,
    WeatherCondition, PLACEHOLDER,
};
use crate::data::{build_window, ForecastPayload, HourlyReading, Location};
use crate::ui::chart_style;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error("Failed to fetch forecast: {0}")]
    Fetch(#[from] ClientError),

    #[error("Failed to write chart: {0}")]
    Io(#[from] io::Error),
}

/// Fetches and prints one report
pub async fn run(args: &SnapshotArgs, settings: &Settings) -> Result<(), SnapshotError> {
    let startup = StartupConfig::from_args(&args.location, &args.view)?;
    let proxy_url = startup
        .proxy_url
        .clone()
        .unwrap_or_else(|| settings.proxy_url.clone());
    let window_size = startup.window_size.unwrap_or(settings.window_size);

    let payload = ForecastClient::new(proxy_url)
        .fetch(&startup.location)
        .await?;
    let window = window_at(&payload, Utc::now(), window_size);

    print!("{}", render_report(&startup.location, &payload, &window));

    if let Some(dir) = &args.svg_dir {
        for path in write_charts(dir, &window, &chart_style(settings))? {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Plain-text report of current conditions and the hourly window
pub fn render_report(location: &Location, payload: &ForecastPayload, window: &[HourlyReading]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({:.4}, {:.4}) {}",
        location.display_name(),
        location.latitude(),
        location.longitude(),
        location.time_zone()
    );

    match &payload.current {
        Some(current) => {
            let condition = current
                .weather_code
                .map(|c| WeatherCondition::from_wmo_code(c).description())
                .unwrap_or(PLACEHOLDER);
            let _ = writeln!(out, "{} {condition}", weather_emoji(current.weather_code));
            let _ = writeln!(
                out,
                "Temperature  {}  (feels like {})",
                format_with_unit(current.temperature_2m, "°C"),
                format_with_unit(current.apparent_temperature, "°C")
            );
            let _ = writeln!(
                out,
                "Humidity     {}",
                format_with_unit(current.relative_humidity_2m, "%")
            );
            let _ = writeln!(
                out,
                "Rain         {}",
                format_with_unit(current.precipitation, "mm")
            );
            let _ = writeln!(
                out,
                "Wind         {} {}",
                format_with_unit(current.wind_speed_10m, "km/h"),
                wind_direction_text(current.wind_direction_10m)
            );
        }
        None => {
            let _ = writeln!(out, "No current conditions");
        }
    }
    let _ = writeln!(
        out,
        "Map          {}",
        map_embed_url(location.latitude(), location.longitude())
    );

    out.push('\n');
    if window.is_empty() {
        let _ = writeln!(out, "No upcoming hours");
        return out;
    }
    let _ = writeln!(out, "{:<7}{:<11}{:<10}{}", "Hour", "Temp", "Rain", "Wind");
    for reading in window {
        let _ = writeln!(
            out,
            "{:<7}{:<11}{:<10}{}",
            hour_label(&reading.time),
            format_with_unit(reading.temperature_c, "°C"),
            format_with_unit(Some(reading.precipitation_mm), "mm"),
            format_with_unit(reading.wind_speed_kmh, "km/h")
        );
    }
    out
}

/// Writes `temperature.svg` and `precipitation.svg` into `dir`
///
/// # Returns
/// * `Ok(paths)` - The files written
/// * `Err(io::Error)` - If the directory or a file could not be written
pub fn write_charts(dir: &Path, window: &[HourlyReading], style: &ChartStyle) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let temps: Vec<Option<f64>> = window.iter().map(|r| r.temperature_c).collect();
    let rain: Vec<Option<f64>> = window.iter().map(|r| Some(r.precipitation_mm)).collect();

    let temperature = match LineChart::new(&temps, LINE_CHART_HEIGHT) {
        Some(chart) => chart.to_svg("Temperature", "°C", style),
        None => empty_svg("Temperature", LINE_CHART_HEIGHT, style),
    };
    let precipitation = match BarChart::new(&rain, BAR_CHART_HEIGHT) {
        Some(chart) => chart.to_svg("Precipitation", "mm", style),
        None => empty_svg("Precipitation", BAR_CHART_HEIGHT, style),
    };

    let mut written = Vec::new();
    for (name, svg) in [
        ("temperature.svg", temperature),
        ("precipitation.svg", precipitation),
    ] {
        let path = dir.join(name);
        fs::write(&path, svg)?;
        info!(path = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}

/// Builds the window the same way the dashboard does
pub fn window_at(payload: &ForecastPayload, now: DateTime<Utc>, window_size: usize) -> Vec<HourlyReading> {
    build_window(payload.hourly.as_ref(), payload.local_now(now), window_size)
}
