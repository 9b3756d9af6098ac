//! OreeAI - a terminal dashboard for email outreach.
//!
//! This application provides a fast, keyboard-driven interface for the
//! OreeAI backend: leads, companies, replies, and the ideal customer
//! profile used for prospecting.

mod app;
mod form;
mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oreeai_core::auth::{CredentialStore, Session};
use oreeai_core::{ApiClient, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_NAME: &str = "oreeai.log";

const USAGE: &str = "\
Usage: oreeai [OPTION]

Options:
  --login     Sign in from the command line and save the session
  --logout    Sign out and forget stored credentials
  --help      Show this message

With no option the dashboard starts. Set OREE_API_URL to point at a
different backend and RUST_LOG to change log verbosity.";

/// Initialize file logging. The terminal belongs to the UI, so nothing is
/// written to stderr. The returned guard flushes the log on drop.
fn init_tracing() -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::cache_dir().unwrap_or_else(|_| std::env::temp_dir());
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--login") => return cli_login().await,
        Some("--logout") => return cli_logout().await,
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown option: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
        None => {}
    }

    info!("OreeAI dashboard starting");

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if app.is_authenticated() {
        app.refresh_current_tab();
    } else {
        app.start_login();
    }

    // Main loop
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

    info!("OreeAI dashboard shutting down");
    Ok(())
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim();
    Ok(match (value.is_empty(), default) {
        (true, Some(d)) => d.to_string(),
        _ => value.to_string(),
    })
}

/// Interactive sign-in without starting the dashboard.
async fn cli_login() -> Result<()> {
    let mut config = Config::load()?;
    let email = prompt("Email", config.last_email.as_deref())?;
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    let password = match CredentialStore::get_password(&email) {
        Ok(saved) => {
            let entered = rpassword::prompt_password("Password (Enter to use saved): ")?;
            if entered.is_empty() {
                saved
            } else {
                entered
            }
        }
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let api = ApiClient::new(&config.api_base_url())?;
    let session_data = api
        .authenticate(&email, &password)
        .await
        .context("Sign in failed")?;

    if let Err(e) = CredentialStore::store(&email, &password) {
        warn!(error = %e, "Failed to store credentials");
    }
    config.last_email = Some(email.clone());
    config.save()?;

    let mut session = Session::new(Config::config_dir()?);
    let name = session_data.user.name.clone();
    session.update(session_data);
    session.save()?;

    println!("Signed in as {} <{}>", name, email);
    Ok(())
}

async fn cli_logout() -> Result<()> {
    let config = Config::load()?;
    let mut session = Session::new(Config::config_dir()?);

    if session.load()? {
        if let Some(token) = session.token() {
            let api = ApiClient::new(&config.api_base_url())?.with_token(token.to_string());
            if let Err(e) = api.logout().await {
                warn!(error = %e, "Logout request failed");
            }
        }
    }
    session.clear()?;

    if let Some(email) = config.last_email.as_deref() {
        if let Err(e) = CredentialStore::delete(email) {
            warn!(error = %e, "Failed to delete stored credentials");
        }
    }

    println!("Signed out");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Apply completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
