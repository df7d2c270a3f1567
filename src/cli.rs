//! Command-line interface parsing for Skyglance
//!
//! Without a subcommand the dashboard starts. `serve` runs the forecast proxy
//! and `snapshot` prints one forecast report without opening the TUI.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::data::presets::preset_index;
use crate::data::{all_presets, Location, LocationError, DEFAULT_TIME_ZONE};
use crate::proxy::ServeConfig;
use crate::upstream::OPEN_METEO_BASE_URL;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified city key is not a preset
    #[error("Invalid city: '{0}'. Valid cities: TH-BKK, TH-CNX, JP-TYO, US-NYC")]
    InvalidCity(String),

    /// Manual coordinates failed validation
    #[error("Invalid location: {0}")]
    InvalidLocation(#[from] LocationError),
}

/// Skyglance - Current conditions and hourly forecasts in the terminal
#[derive(Parser, Debug)]
#[command(name = "skyglance")]
#[command(about = "Weather dashboard and Open-Meteo forecast proxy")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub location: LocationArgs,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the forecast proxy
    Serve(ServeArgs),

    /// Print the forecast once and exit
    ///
    /// Examples:
    ///   skyglance snapshot --city JP-TYO
    ///   skyglance snapshot --lat 51.5072 --lon -0.1276 --tz Europe/London --svg-dir out
    Snapshot(SnapshotArgs),
}

/// Which location to show first
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Preset city key
    ///
    /// Valid cities: TH-BKK, TH-CNX, JP-TYO, US-NYC
    #[arg(long, value_name = "KEY", conflicts_with_all = ["lat", "lon", "tz"])]
    pub city: Option<String>,

    /// Latitude in degrees, -90 to 90
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in degrees, -180 to 180
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// IANA time zone for --lat/--lon (default Asia/Bangkok)
    #[arg(long, value_name = "ZONE", requires = "lat")]
    pub tz: Option<String>,
}

impl LocationArgs {
    /// Resolves the flags to a location
    ///
    /// # Returns
    /// * `Ok((location, Some(index)))` for a preset (the first one when no flag is given)
    /// * `Ok((location, None))` for manual coordinates
    /// * `Err(CliError)` for an unknown city or invalid coordinates
    pub fn resolve(&self) -> Result<(Location, Option<usize>), CliError> {
        if let Some(key) = &self.city {
            let index = preset_index(key).ok_or_else(|| CliError::InvalidCity(key.clone()))?;
            return Ok((all_presets()[index].location(), Some(index)));
        }

        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            let tz = self.tz.as_deref().unwrap_or(DEFAULT_TIME_ZONE);
            return Ok((Location::new(lat, lon, tz)?, None));
        }

        Ok((all_presets()[0].location(), Some(0)))
    }
}

/// Options shared by the dashboard and `snapshot`
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Base URL of the forecast proxy
    #[arg(long, value_name = "URL", env = "SKYGLANCE_PROXY_URL")]
    pub proxy: Option<String>,

    /// Number of upcoming hours to show
    #[arg(long, value_name = "HOURS", value_parser = clap::value_parser!(u16).range(1..))]
    pub window: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SKYGLANCE_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Forecast endpoint to forward requests to
    #[arg(long, value_name = "URL", env = "SKYGLANCE_UPSTREAM_URL", default_value = OPEN_METEO_BASE_URL)]
    pub upstream: String,

    /// Upstream request timeout in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl ServeArgs {
    pub fn config(&self) -> ServeConfig {
        ServeConfig {
            bind: self.bind,
            upstream_url: self.upstream.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Also write temperature.svg and precipitation.svg into this directory
    #[arg(long, value_name = "DIR")]
    pub svg_dir: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Location fetched first
    pub location: Location,
    /// Picker entry to highlight, `None` for manual coordinates
    pub preset_index: Option<usize>,
    /// Overrides the saved proxy URL
    pub proxy_url: Option<String>,
    /// Overrides the saved window size
    pub window_size: Option<usize>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            location: all_presets()[0].location(),
            preset_index: Some(0),
            proxy_url: None,
            window_size: None,
        }
    }
}

impl StartupConfig {
    /// Builds the startup configuration from location and view flags
    ///
    /// # Arguments
    /// * `location` - The parsed location flags
    /// * `view` - The parsed proxy/window flags
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the resolved location
    /// * `Err(CliError)` if the location flags are invalid
    pub fn from_args(location: &LocationArgs, view: &ViewArgs) -> Result<Self, CliError> {
        let (location, preset_index) = location.resolve()?;
        Ok(StartupConfig {
            location,
            preset_index,
            proxy_url: view.proxy.clone(),
            window_size: view.window.map(usize::from),
        })
    }

    /// Creates a StartupConfig from the top-level dashboard flags
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Self::from_args(&cli.location, &cli.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["skyglance"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.location.city.is_none());
        assert!(cli.view.window.is_none());
    }

    #[test]
    fn test_startup_config_default_is_first_preset() {
        let cli = Cli::try_parse_from(["skyglance"]).unwrap();
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.preset_index, Some(0));
        assert_eq!(config.location.time_zone(), "Asia/Bangkok");
        assert_eq!(config.location.label(), Some("Bangkok"));
    }

    #[test]
    fn test_city_flag_selects_preset() {
        let cli = Cli::try_parse_from(["skyglance", "--city", "jp-tyo"]).unwrap();
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.preset_index, Some(2));
        assert_eq!(config.location.time_zone(), "Asia/Tokyo");
    }

    #[test]
    fn test_invalid_city() {
        let cli = Cli::try_parse_from(["skyglance", "--city", "XX-ATL"]).unwrap();
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid city"));
        assert!(err.to_string().contains("XX-ATL"));
    }

    #[test]
    fn test_manual_coordinates_accept_negative_values() {
        let cli = Cli::try_parse_from([
            "skyglance",
            "--lat",
            "-33.8688",
            "--lon",
            "151.2093",
            "--tz",
            "Australia/Sydney",
        ])
        .unwrap();
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.preset_index, None);
        assert_eq!(config.location.latitude(), -33.8688);
        assert_eq!(config.location.time_zone(), "Australia/Sydney");
    }

    #[test]
    fn test_manual_coordinates_default_time_zone() {
        let cli = Cli::try_parse_from(["skyglance", "--lat", "10", "--lon", "20"]).unwrap();
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.location.time_zone(), DEFAULT_TIME_ZONE);
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let cli = Cli::try_parse_from(["skyglance", "--lat", "95", "--lon", "0"]).unwrap();
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(
            err,
            CliError::InvalidLocation(LocationError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_lat_without_lon_is_a_usage_error() {
        assert!(Cli::try_parse_from(["skyglance", "--lat", "10"]).is_err());
    }

    #[test]
    fn test_city_conflicts_with_coordinates() {
        assert!(
            Cli::try_parse_from(["skyglance", "--city", "TH-BKK", "--lat", "1", "--lon", "2"])
                .is_err()
        );
    }

    #[test]
    fn test_window_must_be_positive() {
        assert!(Cli::try_parse_from(["skyglance", "--window", "0"]).is_err());
        let cli = Cli::try_parse_from(["skyglance", "--window", "24"]).unwrap();
        assert_eq!(StartupConfig::from_cli(&cli).unwrap().window_size, Some(24));
    }

    #[test]
    fn test_serve_timeout_must_be_positive() {
        assert!(Cli::try_parse_from(["skyglance", "serve", "--timeout-secs", "0"]).is_err());
        let cli = Cli::try_parse_from(["skyglance", "serve", "--timeout-secs", "1"]).unwrap();
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(args.config().timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["skyglance", "serve"]).unwrap();
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        let config = args.config();
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.upstream_url, OPEN_METEO_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_serve_with_options() {
        let cli = Cli::try_parse_from([
            "skyglance",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--upstream",
            "http://localhost:9000/v1/forecast",
            "--timeout-secs",
            "3",
        ])
        .unwrap();
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.port(), 8080);
        assert_eq!(args.config().timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_snapshot_takes_its_own_location() {
        let cli = Cli::try_parse_from([
            "skyglance",
            "snapshot",
            "--city",
            "US-NYC",
            "--svg-dir",
            "out",
        ])
        .unwrap();
        let Some(Command::Snapshot(args)) = cli.command else {
            panic!("expected snapshot");
        };
        let config = StartupConfig::from_args(&args.location, &args.view).unwrap();
        assert_eq!(config.location.time_zone(), "America/New_York");
        assert_eq!(args.svg_dir, Some(PathBuf::from("out")));
    }
}
