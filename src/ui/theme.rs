//! Terminal colours for each theme/contrast combination

use ratatui::style::Color;

use crate::config::{Contrast, Settings, Theme};
use crate::data::chart::ChartStyle;

/// Colours used across the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    /// Background of the highlighted picker row
    pub highlight: Color,
    pub temperature: Color,
    pub precipitation: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_settings(settings: &Settings) -> Self {
        match (settings.theme, settings.contrast) {
            (Theme::Light, Contrast::Normal) => Self {
                background: Color::Rgb(248, 250, 252),
                text: Color::Rgb(15, 23, 42),
                muted: Color::Rgb(100, 116, 139),
                border: Color::Rgb(203, 213, 225),
                accent: Color::Rgb(37, 99, 235),
                highlight: Color::Rgb(219, 234, 254),
                temperature: Color::Rgb(234, 88, 12),
                precipitation: Color::Rgb(14, 165, 233),
                error: Color::Rgb(185, 28, 28),
            },
            (Theme::Dark, Contrast::Normal) => Self {
                background: Color::Rgb(15, 23, 42),
                text: Color::Rgb(226, 232, 240),
                muted: Color::Rgb(148, 163, 184),
                border: Color::Rgb(51, 65, 85),
                accent: Color::Rgb(96, 165, 250),
                highlight: Color::Rgb(30, 58, 138),
                temperature: Color::Rgb(251, 146, 60),
                precipitation: Color::Rgb(56, 189, 248),
                error: Color::Rgb(248, 113, 113),
            },
            (Theme::Light, Contrast::High) => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Black,
                border: Color::Black,
                accent: Color::Blue,
                highlight: Color::Yellow,
                temperature: Color::Black,
                precipitation: Color::Blue,
                error: Color::Red,
            },
            (Theme::Dark, Contrast::High) => Self {
                background: Color::Black,
                text: Color::White,
                muted: Color::White,
                border: Color::White,
                accent: Color::Yellow,
                highlight: Color::Blue,
                temperature: Color::Yellow,
                precipitation: Color::Cyan,
                error: Color::LightRed,
            },
        }
    }
}

/// SVG colours matching the settings
pub fn chart_style(settings: &Settings) -> ChartStyle {
    match (settings.theme, settings.contrast) {
        (_, Contrast::High) => ChartStyle::HIGH_CONTRAST,
        (Theme::Dark, Contrast::Normal) => ChartStyle::DARK,
        (Theme::Light, Contrast::Normal) => ChartStyle::LIGHT,
    }
}
