//! Forecast load state for the dashboard
//!
//! The controller owns the selected location and the last forecast received.
//! Every selection (re-selecting the current location included) issues a new
//! request sequence number; only the completion carrying the latest number is
//! committed, so a slow response to a superseded request can never overwrite
//! a newer one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::ClientError;
use crate::data::{build_window, ForecastPayload, HourlyReading, Location};

/// Load state of the forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    /// A request is in flight for the current location
    Loading,
    /// The latest request succeeded
    Loaded,
    /// The latest request failed
    Failed,
}

/// A request the caller must dispatch, then report back via
/// [`ForecastController::complete`]
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub location: Location,
}

/// A forecast together with the location it was fetched for
#[derive(Debug, Clone)]
pub struct ForecastSnapshot {
    pub location: Location,
    pub payload: Arc<ForecastPayload>,
    pub fetched_at: DateTime<Utc>,
}

/// Owner of the current location and forecast
#[derive(Debug, Clone)]
pub struct ForecastController {
    location: Location,
    state: LoadState,
    latest_seq: u64,
    /// Location of the request `latest_seq` belongs to
    pending_location: Option<Location>,
    snapshot: Option<ForecastSnapshot>,
    error: Option<String>,
}

impl ForecastController {
    /// Creates an idle controller with `location` selected
    pub fn new(location: Location) -> Self {
        Self {
            location,
            state: LoadState::Idle,
            latest_seq: 0,
            pending_location: None,
            snapshot: None,
            error: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Last forecast received, kept visible through later failures
    pub fn snapshot(&self) -> Option<&ForecastSnapshot> {
        self.snapshot.as_ref()
    }

    /// Message of the latest failure, cleared when a new request starts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Selects a location and starts loading it
    ///
    /// Always returns a new ticket, even when `location` equals the current
    /// one.
    pub fn select(&mut self, location: Location) -> FetchTicket {
        self.latest_seq += 1;
        self.location = location.clone();
        self.pending_location = Some(location.clone());
        self.state = LoadState::Loading;
        self.error = None;

        debug!(seq = self.latest_seq, location = %location.display_name(), "forecast requested");
        FetchTicket {
            seq: self.latest_seq,
            location,
        }
    }

    /// Re-applies the current location
    pub fn refresh(&mut self) -> FetchTicket {
        self.select(self.location.clone())
    }

    /// Reports the outcome of a request
    ///
    /// Returns `false` (and changes nothing) when `seq` belongs to a
    /// superseded request or the latest request already completed.
    pub fn complete(&mut self, seq: u64, result: Result<ForecastPayload, ClientError>) -> bool {
        if seq != self.latest_seq || self.state != LoadState::Loading {
            debug!(seq, latest = self.latest_seq, "discarding stale forecast response");
            return false;
        }

        let location = self
            .pending_location
            .take()
            .unwrap_or_else(|| self.location.clone());

        match result {
            Ok(payload) => {
                info!(seq, location = %location.display_name(), "forecast loaded");
                self.snapshot = Some(ForecastSnapshot {
                    location,
                    payload: Arc::new(payload),
                    fetched_at: Utc::now(),
                });
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(seq, location = %location.display_name(), error = %err, "forecast failed");
                self.error = Some(err.to_string());
                self.state = LoadState::Failed;
            }
        }
        true
    }

    /// Upcoming hours of the displayed forecast
    pub fn hourly_window(&self, now: DateTime<Utc>, window_size: usize) -> Vec<HourlyReading> {
        match &self.snapshot {
            Some(snapshot) => {
                let payload = &snapshot.payload;
                build_window(payload.hourly.as_ref(), payload.local_now(now), window_size)
            }
            None => Vec::new(),
        }
    }
}
