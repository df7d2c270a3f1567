//! Application state management for Skyglance
//!
//! This module contains the dashboard state: the preset picker, the manual
//! location editor, display preferences, and keyboard handling. Network work
//! is not done here; selecting a location queues a [`FetchTicket`] that the
//! main loop hands to the fetch task.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::cli::StartupConfig;
use crate::config::{Settings, SettingsStore};
use crate::controller::{FetchTicket, ForecastController};
use crate::data::presets::CityPreset;
use crate::data::{all_presets, HourlyReading, Location};
use crate::fetch::FetchMessage;

/// What keystrokes currently do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Keys navigate and trigger actions
    Normal,
    /// Keys edit a `lat,lon,tz` entry
    EditingLocation {
        buffer: String,
        /// Validation message from the last Enter
        error: Option<String>,
    },
}

/// Main application struct managing state and data
pub struct App {
    /// Cursor position in the preset picker
    pub selected_index: usize,
    /// Preset the displayed location came from, `None` for manual entries
    pub active_preset: Option<usize>,
    /// Current location and forecast
    pub controller: ForecastController,
    /// Persisted preferences
    pub settings: Settings,
    /// Hours shown in the table and sparklines
    pub window_size: usize,
    pub input_mode: InputMode,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Last failure to write the settings file
    pub settings_error: Option<String>,
    store: SettingsStore,
    /// Requests waiting to be dispatched
    pending: Vec<FetchTicket>,
}

impl App {
    /// Creates the app and queues the first forecast request
    ///
    /// # Arguments
    /// * `startup` - Location and overrides from the command line
    /// * `settings` - Preferences loaded from `store`
    /// * `store` - Where preference changes are saved
    pub fn new(startup: StartupConfig, settings: Settings, store: SettingsStore) -> Self {
        let window_size = startup.window_size.unwrap_or(settings.window_size);
        let mut controller = ForecastController::new(startup.location.clone());
        let first = controller.select(startup.location);

        Self {
            selected_index: startup.preset_index.unwrap_or(0),
            active_preset: startup.preset_index,
            controller,
            settings,
            window_size,
            input_mode: InputMode::Normal,
            show_help: false,
            should_quit: false,
            settings_error: None,
            store,
            pending: vec![first],
        }
    }

    /// Returns the preset under the picker cursor
    pub fn selected_preset(&self) -> Option<&'static CityPreset> {
        all_presets().get(self.selected_index)
    }

    /// Drains the queued requests
    pub fn take_pending(&mut self) -> Vec<FetchTicket> {
        std::mem::take(&mut self.pending)
    }

    /// Feeds a finished fetch to the controller
    pub fn handle_fetch(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Completed { seq, result } => {
                self.controller.complete(seq, result);
            }
        }
    }

    /// Upcoming hours of the displayed forecast
    pub fn hourly_window(&self, now: DateTime<Utc>) -> Vec<HourlyReading> {
        self.controller.hourly_window(now, self.window_size)
    }

    /// Handles keyboard input based on the current mode
    ///
    /// Key bindings:
    /// - `q` or `Esc`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move the picker cursor
    /// - `Enter`: Load the preset under the cursor
    /// - `1`-`4`: Load a preset directly
    /// - `e`: Enter coordinates manually
    /// - `r`: Refresh the current location
    /// - `t`: Toggle light/dark theme
    /// - `c`: Toggle high contrast
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        if let InputMode::EditingLocation { .. } = self.input_mode {
            self.handle_edit_key(key_event);
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
            }
            KeyCode::Enter => {
                self.select_preset(self.selected_index);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < all_presets().len() {
                    self.select_preset(index);
                }
            }
            KeyCode::Char('e') => {
                self.start_editing();
            }
            KeyCode::Char('r') => {
                self.refresh();
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
            }
            KeyCode::Char('c') => {
                self.toggle_contrast();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key_event: KeyEvent) {
        let InputMode::EditingLocation { buffer, error } = &mut self.input_mode else {
            return;
        };

        match key_event.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => match Location::parse_manual(buffer) {
                Ok(location) => {
                    self.input_mode = InputMode::Normal;
                    self.select_location(location, None);
                }
                Err(err) => {
                    *error = Some(err.to_string());
                }
            },
            KeyCode::Backspace => {
                buffer.pop();
                *error = None;
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                *error = None;
            }
            _ => {}
        }
    }

    /// Opens the editor prefilled with the current location
    fn start_editing(&mut self) {
        let location = self.controller.location();
        let buffer = format!(
            "{},{},{}",
            location.latitude(),
            location.longitude(),
            location.time_zone()
        );
        self.input_mode = InputMode::EditingLocation {
            buffer,
            error: None,
        };
    }

    /// Loads the preset at `index`
    pub fn select_preset(&mut self, index: usize) {
        if let Some(preset) = all_presets().get(index) {
            self.selected_index = index;
            self.select_location(preset.location(), Some(index));
        }
    }

    /// Replaces the current location and queues a request for it
    pub fn select_location(&mut self, location: Location, preset: Option<usize>) {
        self.active_preset = preset;
        let ticket = self.controller.select(location);
        self.pending.push(ticket);
    }

    /// Re-requests the current location
    pub fn refresh(&mut self) {
        let ticket = self.controller.refresh();
        self.pending.push(ticket);
    }

    pub fn toggle_theme(&mut self) {
        self.settings.theme = self.settings.theme.toggled();
        self.save_settings();
    }

    pub fn toggle_contrast(&mut self) {
        self.settings.contrast = self.settings.contrast.toggled();
        self.save_settings();
    }

    fn save_settings(&mut self) {
        match self.store.save(&self.settings) {
            Ok(()) => self.settings_error = None,
            Err(err) => {
                warn!(error = %err, "failed to save settings");
                self.settings_error = Some(err.to_string());
            }
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = all_presets().len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = all_presets().len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}
