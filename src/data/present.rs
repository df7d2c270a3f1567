//! Presentation helpers shared by the dashboard and the text snapshot
//!
//! Weather code icons, compass text for wind direction, formatting of values
//! that may be unknown, and the map embed link.

/// Shown in place of a value the provider did not send
pub const PLACEHOLDER: &str = "—";

/// Half-width of the map bounding box, in degrees
pub const MAP_SPAN_DEGREES: f64 = 0.12;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Weather groups keyed off WMO weather codes
///
/// Codes per https://open-meteo.com/en/docs#weathervariables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    FreezingRain,
    Snow,
    Thunderstorm,
    ThunderstormHail,
    /// A code outside the documented table
    Other,
}

impl WeatherCondition {
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            61 | 63 | 65 | 80 | 81 | 82 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormHail,
            _ => Self::Other,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "\u{2600}\u{FE0F}",
            Self::PartlyCloudy => "\u{26C5}\u{FE0F}",
            Self::Fog => "\u{1F32B}\u{FE0F}",
            Self::Drizzle => "\u{1F326}\u{FE0F}",
            Self::Rain => "\u{1F327}\u{FE0F}",
            Self::FreezingRain => "\u{1F328}\u{FE0F}\u{1F9CA}",
            Self::Snow => "\u{2744}\u{FE0F}",
            Self::Thunderstorm => "\u{26C8}\u{FE0F}",
            Self::ThunderstormHail => "\u{26C8}\u{FE0F}\u{1F9CA}",
            Self::Other => "\u{1F321}\u{FE0F}",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormHail => "Thunderstorm with hail",
            Self::Other => "Unclassified",
        }
    }
}

/// Icon for an optional weather code (question mark when unknown)
pub fn weather_emoji(code: Option<i64>) -> &'static str {
    code.map_or("\u{2753}", |c| WeatherCondition::from_wmo_code(c).emoji())
}

/// 16-point compass text for a wind direction in degrees
pub fn wind_direction_text(degrees: Option<f64>) -> &'static str {
    match degrees {
        Some(d) if d.is_finite() => {
            let index = ((d / 22.5).round() as i64).rem_euclid(16) as usize;
            COMPASS_POINTS[index]
        }
        _ => PLACEHOLDER,
    }
}

/// Formats a value with one decimal, or the placeholder when unknown
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Formats a value followed by its unit, or the bare placeholder
pub fn format_with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Hour of an hourly timestamp (`"2024-07-15T14:00"` → `"14:00"`)
pub fn hour_label(raw: &str) -> &str {
    match raw.split_once('T') {
        Some((_, time)) if !time.is_empty() => time,
        _ if raw.is_empty() => PLACEHOLDER,
        _ => raw,
    }
}

/// OpenStreetMap embed URL centred on the coordinate
pub fn map_embed_url(latitude: f64, longitude: f64) -> String {
    let d = MAP_SPAN_DEGREES;
    format!(
        "https://www.openstreetmap.org/export/embed.html?bbox={:.4},{:.4},{:.4},{:.4}&layer=mapnik&marker={:.4},{:.4}",
        longitude - d,
        latitude - d,
        longitude + d,
        latitude + d,
        latitude,
        longitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_groups() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        for code in [1, 2, 3] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::PartlyCloudy);
        }
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_wmo_code(53), WeatherCondition::Drizzle);
        for code in [61, 63, 65, 80, 81, 82] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::Rain);
        }
        assert_eq!(WeatherCondition::from_wmo_code(67), WeatherCondition::FreezingRain);
        for code in [71, 73, 75, 77, 85, 86] {
            assert_eq!(WeatherCondition::from_wmo_code(code), WeatherCondition::Snow);
        }
        assert_eq!(WeatherCondition::from_wmo_code(95), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::ThunderstormHail);
    }

    #[test]
    fn test_undocumented_codes_are_other() {
        // 56/57 (freezing drizzle) have no icon of their own
        assert_eq!(WeatherCondition::from_wmo_code(56), WeatherCondition::Other);
        assert_eq!(WeatherCondition::from_wmo_code(-1), WeatherCondition::Other);
        assert_eq!(WeatherCondition::from_wmo_code(1000), WeatherCondition::Other);
    }

    #[test]
    fn test_weather_emoji() {
        assert_eq!(weather_emoji(None), "\u{2753}");
        assert_eq!(weather_emoji(Some(0)), "\u{2600}\u{FE0F}");
        assert_eq!(weather_emoji(Some(42)), "\u{1F321}\u{FE0F}");
    }

    #[test]
    fn test_wind_direction_text() {
        assert_eq!(wind_direction_text(Some(0.0)), "N");
        assert_eq!(wind_direction_text(Some(11.0)), "N");
        assert_eq!(wind_direction_text(Some(12.0)), "NNE");
        assert_eq!(wind_direction_text(Some(90.0)), "E");
        assert_eq!(wind_direction_text(Some(225.0)), "SW");
        assert_eq!(wind_direction_text(Some(350.0)), "N");
        assert_eq!(wind_direction_text(Some(360.0)), "N");
        assert_eq!(wind_direction_text(Some(-90.0)), "W");
    }

    #[test]
    fn test_wind_direction_unknown() {
        assert_eq!(wind_direction_text(None), PLACEHOLDER);
        assert_eq!(wind_direction_text(Some(f64::NAN)), PLACEHOLDER);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(31.24)), "31.2");
        assert_eq!(format_value(None), "—");
        assert_eq!(format_with_unit(Some(9.7), "km/h"), "9.7 km/h");
        assert_eq!(format_with_unit(None, "km/h"), "—");
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(hour_label("2024-07-15T14:00"), "14:00");
        assert_eq!(hour_label("garbage"), "garbage");
        assert_eq!(hour_label(""), PLACEHOLDER);
    }

    #[test]
    fn test_map_embed_url() {
        assert_eq!(
            map_embed_url(13.7563, 100.5018),
            "https://www.openstreetmap.org/export/embed.html?bbox=100.3818,13.6363,100.6218,13.8763&layer=mapnik&marker=13.7563,100.5018"
        );
    }
}
