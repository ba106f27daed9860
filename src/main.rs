//! e-Residency - Terminal Registration Demo
//!
//! Runs the mocked e-Residency flow in the terminal: sign in, submit an
//! identity application, view the digital ID, and register a business.
//! Session data is kept in a local storage file and restored on restart.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;

use eresidency::application::{App, Session, SessionConfig};
use eresidency::infrastructure::{init_logging, AppConfig, FileStore, LocalStore};
use eresidency::presentation::{render_ui, InputHandler};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Entry point for the e-Residency terminal demo.
///
/// Loads configuration, starts file logging, rehydrates the session from
/// the local storage file, and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if configuration, storage, or terminal setup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.log_file(), &config.log_level)?;

    let store = FileStore::open(&config.data_dir)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = %store.path().display(),
        "Starting e-Residency demo"
    );

    let session = Session::new(
        store,
        SessionConfig {
            login_delay: config.login_delay(),
        },
    );
    let mut app = App::new(session, config.submit_delay());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    info!("Exiting e-Residency demo");
    Ok(())
}

/// Main application event loop.
///
/// Redraws after every change. A pending action is drawn once with its
/// loading label and then awaited before more input is read.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
async fn run_app<B: Backend, S: LocalStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if app.pending.is_some() {
            app.run_pending().await;
            continue;
        }

        if let Some(event) = next_event(POLL_INTERVAL).await? {
            InputHandler::handle_event(app, event);
        }
    }
}

/// Waits up to `timeout` for a terminal event on the blocking thread pool.
async fn next_event(timeout: Duration) -> io::Result<Option<Event>> {
    tokio::task::spawn_blocking(move || {
        if event::poll(timeout)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    })
    .await
    .map_err(io::Error::other)?
}
