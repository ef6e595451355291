use std::io;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod config;
mod db;
mod error;
mod models;
mod pipeline;
mod stats;
mod tui;

use app::App;
use config::Config;
use db::SupabaseClient;
use error::Result;
use pipeline::join::join_aggregate;
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    // Check for --check flag (headless fetch, print diagnostics, exit)
    if args.len() >= 2 && args[1] == "--check" {
        return check_source(&config).await;
    }

    // Initialize app
    let mut app = App::new(&config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Poll for events with a timeout so refreshes stay responsive
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.show_help) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Fetches the snapshot once and prints row and drop counts. Lets a
/// deployment verify its credentials and data without entering the TUI.
async fn check_source(config: &Config) -> Result<()> {
    let (url, key) = config.credentials()?;
    let client = SupabaseClient::new(url, key)?;
    let snapshot = client.fetch_snapshot().await?;

    println!(
        "peaks: {}  routes: {}  ascents: {}",
        snapshot.peaks.len(),
        snapshot.routes.len(),
        snapshot.ascents.len()
    );

    let (views, stats) = join_aggregate(&snapshot);
    println!(
        "peak views: {}  orphan routes: {}  orphan ascents: {}",
        views.len(),
        stats.orphan_routes,
        stats.orphan_ascents
    );

    Ok(())
}
