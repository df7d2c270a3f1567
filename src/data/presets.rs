//! Static city presets offered by the location picker
//!
//! The first preset doubles as the default location and matches the
//! proxy's fallback coordinates.

use super::Location;

/// A city the user can pick without typing coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityPreset {
    /// Unique key, also accepted by `--city`
    pub key: &'static str,
    /// Human-readable city name
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 country code
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA time zone
    pub time_zone: &'static str,
}

/// All presets, in picker order
pub static PRESETS: [CityPreset; 4] = [
    CityPreset {
        key: "TH-BKK",
        name: "Bangkok",
        country: "TH",
        latitude: 13.7563,
        longitude: 100.5018,
        time_zone: "Asia/Bangkok",
    },
    CityPreset {
        key: "TH-CNX",
        name: "Chiang Mai",
        country: "TH",
        latitude: 18.7877,
        longitude: 98.9931,
        time_zone: "Asia/Bangkok",
    },
    CityPreset {
        key: "JP-TYO",
        name: "Tokyo",
        country: "JP",
        latitude: 35.6762,
        longitude: 139.6503,
        time_zone: "Asia/Tokyo",
    },
    CityPreset {
        key: "US-NYC",
        name: "New York",
        country: "US",
        latitude: 40.7128,
        longitude: -74.0060,
        time_zone: "America/New_York",
    },
];

/// Returns all presets
pub fn all_presets() -> &'static [CityPreset] {
    &PRESETS
}

/// Position of a preset in picker order
pub fn preset_index(key: &str) -> Option<usize> {
    PRESETS.iter().position(|p| p.key.eq_ignore_ascii_case(key))
}

impl CityPreset {
    /// The preset as a labelled location
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
            time_zone: self.time_zone.to_string(),
            label: Some(self.name.to_string()),
        }
    }

    /// Flag emoji for the preset's country
    pub fn flag(&self) -> String {
        country_flag(self.country)
    }
}

/// Turns a two-letter country code into its regional-indicator flag
pub fn country_flag(country: &str) -> String {
    country
        .chars()
        .filter(char::is_ascii_alphabetic)
        .filter_map(|c| char::from_u32(0x1F1A5 + c.to_ascii_uppercase() as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_presets() {
        assert_eq!(all_presets().len(), 4);
    }

    #[test]
    fn test_preset_keys_are_unique() {
        for (i, a) in PRESETS.iter().enumerate() {
            for b in PRESETS.iter().skip(i + 1) {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_presets_build_valid_locations() {
        for preset in all_presets() {
            let location = preset.location();
            let checked = Location::new(
                location.latitude(),
                location.longitude(),
                location.time_zone(),
            );
            assert!(checked.is_ok(), "{} should be a valid location", preset.key);
            assert_eq!(location.label(), Some(preset.name));
        }
    }

    #[test]
    fn test_first_preset_matches_default_location() {
        let first = all_presets()[0].location();
        let default = Location::default();
        assert_eq!(first.latitude(), default.latitude());
        assert_eq!(first.longitude(), default.longitude());
        assert_eq!(first.time_zone(), default.time_zone());
    }

    #[test]
    fn test_preset_lookup_is_case_insensitive() {
        assert_eq!(preset_index("jp-tyo").map(|i| PRESETS[i].name), Some("Tokyo"));
        assert_eq!(preset_index("US-NYC"), Some(3));
        assert!(preset_index("XX-NOPE").is_none());
    }

    #[test]
    fn test_country_flag() {
        assert_eq!(country_flag("TH"), "\u{1F1F9}\u{1F1ED}");
        assert_eq!(country_flag("jp"), "\u{1F1EF}\u{1F1F5}");
        assert_eq!(PRESETS[3].flag(), "\u{1F1FA}\u{1F1F8}");
    }
}
