//! Interactive terminal front end.
//!
//! One task owns the terminal and the `App`. Key and mouse events arrive from
//! crossterm's event stream, replies from spawned request tasks arrive over a
//! channel; both are handled in a single `select!` loop.

use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::HourcastConfig;
use crate::search::Pipeline;
use crate::weather::{ForecastProvider, Geocoder};

pub mod app;
pub mod view;

pub use app::App;

type Term = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the UI until the user quits. The terminal is restored on every exit path.
pub async fn run(
    config: &HourcastConfig,
    geocoder: Arc<dyn Geocoder>,
    forecaster: Arc<dyn ForecastProvider>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, config, geocoder, forecaster).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }
    result
}

async fn event_loop(
    terminal: &mut Term,
    config: &HourcastConfig,
    geocoder: Arc<dyn Geocoder>,
    forecaster: Arc<dyn ForecastProvider>,
) -> Result<()> {
    let (tx, mut replies) = mpsc::unbounded_channel();
    let pipeline = Pipeline::new(geocoder, forecaster, tx);
    let mut app = App::new(config);
    let mut events = EventStream::new();
    info!("Terminal UI started");

    loop {
        let mut regions = None;
        terminal.draw(|frame| regions = Some(view::draw(frame, &app)))?;
        if let Some(regions) = regions {
            app.set_regions(regions);
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    if let Some(command) = app.handle_event(&event) {
                        debug!("Dispatching request {}", command.token());
                        pipeline.spawn(command);
                    }
                }
                Some(Err(e)) => return Err(e).context("Terminal event stream failed"),
                None => break,
            },
            Some(reply) = replies.recv() => app.handle_reply(reply),
        }

        if app.should_quit() {
            break;
        }
    }

    info!("Terminal UI stopped");
    Ok(())
}
