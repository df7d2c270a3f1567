//! Skyglance - Weather dashboard and forecast proxy
//!
//! A terminal UI showing current conditions and the next hours for preset
//! cities or typed coordinates, backed by a small HTTP proxy in front of
//! Open-Meteo.

use std::io;
use std::panic;
use std::process;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use skyglance::app::App;
use skyglance::cli::{Cli, Command, StartupConfig};
use skyglance::client::ForecastClient;
use skyglance::config::SettingsStore;
use skyglance::fetch::FetchHandle;
use skyglance::{logging, proxy, snapshot, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Serve(args)) => {
            logging::init_stderr();
            proxy::serve(args.config()).await
        }
        Some(Command::Snapshot(args)) => {
            logging::init_stderr();
            let settings = SettingsStore::new().load();
            if let Err(err) = snapshot::run(args, &settings).await {
                eprintln!("Error: {err}");
                process::exit(1);
            }
            Ok(())
        }
        None => {
            let startup = match StartupConfig::from_cli(&cli) {
                Ok(startup) => startup,
                Err(err) => {
                    eprintln!("Error: {err}");
                    process::exit(1);
                }
            };
            run_dashboard(startup).await
        }
    }
}

async fn run_dashboard(startup: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_path = logging::init_file();

    let store = SettingsStore::new();
    let settings = store.load();
    let proxy_url = startup
        .proxy_url
        .clone()
        .unwrap_or_else(|| settings.proxy_url.clone());
    info!(proxy = %proxy_url, log = ?log_path, "dashboard starting");

    let mut fetcher = FetchHandle::new(ForecastClient::new(proxy_url));
    let mut app = App::new(startup, settings, store);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &mut fetcher);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(err) = &result {
        error!(error = %err, "dashboard stopped with an error");
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    fetcher: &mut FetchHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for ticket in app.take_pending() {
            fetcher.dispatch(ticket);
        }
        while let Some(message) = fetcher.try_recv() {
            app.handle_fetch(message);
        }

        terminal.draw(|f| ui::render(f, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
