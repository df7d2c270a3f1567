//! Skyglance Library
//!
//! The forecast proxy, the dashboard state and rendering, and the data model
//! they share. The binary in `main.rs` wires them to the terminal and the
//! command line.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod data;
pub mod fetch;
pub mod logging;
pub mod proxy;
pub mod snapshot;
pub mod ui;
pub mod upstream;
