//! Terminal UI for Strictly Clinic.
//!
//! Renders [`SessionSnapshot`](strictly_triage::SessionSnapshot)s from a
//! [`Clinic`] and turns key presses into [`Command`](crate::Command)s.
//! All session state lives in the clinic; [`App`] only holds cursors.

mod app;
mod input;
mod ui;

pub use app::{App, CATEGORIES};
pub use input::{Action, action_for};
pub use ui::{COST_WARNING_THRESHOLD, birth_year, format_cost, wrap_text};

use crate::clinic::{Clinic, Command};
use crate::provider::CaseProvider;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, instrument};

const TICK: Duration = Duration::from_millis(100);

/// Runs the simulator until the user quits.
///
/// Logs go to `log_file` so they don't interfere with the terminal.
pub async fn run_tui<P: CaseProvider + 'static>(clinic: Clinic<P>, log_file: &Path) -> Result<()> {
    let log_file = std::fs::File::create(log_file)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,strictly_clinic=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized

    info!("Starting Strictly Clinic TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, clinic).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop error");
    }

    res
}

#[instrument(skip_all)]
async fn run_loop<P: CaseProvider + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    clinic: Clinic<P>,
) -> Result<()> {
    let mut app = App::new();
    clinic.dispatch(Command::StartSession);

    loop {
        let snapshot = clinic.snapshot();
        terminal.draw(|frame| ui::draw(frame, &snapshot, &app))?;

        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Re-read so keys pressed in one tick see each other's effects.
            let snapshot = clinic.snapshot();
            let Some(action) = action_for(key.code, *snapshot.status()) else {
                continue;
            };
            if let Some(command) = app.handle(action, &snapshot) {
                clinic.dispatch(command);
            }
        }

        if app.should_quit() {
            info!("User quit");
            return Ok(());
        }

        tokio::time::sleep(TICK).await;
    }
}
