//! UI rendering module for Skyglance
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod dashboard;
pub mod help_overlay;
pub mod theme;
pub mod widgets;

use ratatui::Frame;

use crate::app::App;

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;
pub use theme::{chart_style, Palette};

/// Renders the dashboard plus the help overlay when it is open
pub fn render(frame: &mut Frame, app: &App) {
    render_dashboard(frame, app);
    if app.show_help {
        render_help_overlay(frame, &Palette::for_settings(&app.settings));
    }
}
