//! Terminal User Interface Module
//!
//! A keyboard-driven bucket browser on top of [`crate::navigation::Navigator`].
//! Built with Ratatui; network calls run on spawned tasks and report back to
//! the [`App`] through a channel, so the UI never blocks on the proxy.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ 🪣 S3 Explorer  [0] All Buckets › [1] reports › [2] docs        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ▶📁 img                                                         │
//! │  📄 readme.txt                              120 B  Jan 1, 2024  │
//! │                                                                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Ready │ [Enter] Open [Backspace] Up [0-9] Jump [q] Quit [?] Help │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::{App, AppEvent, View};
pub use event::{AppAction, EventHandler};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the browser until the user quits
pub async fn run(config: crate::config::Config) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let mut terminal = init_terminal()?;
    let mut app = App::new(config);
    let mut events = EventHandler::new(Duration::from_millis(120));

    app.start();
    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

async fn run_app(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> anyhow::Result<()> {
    while !app.should_quit {
        // Header, preview meta block, borders and status lines.
        let viewport = terminal.size()?.height.saturating_sub(11);
        let content_height = app
            .navigator
            .preview()
            .map(ui::preview_line_count)
            .unwrap_or(0);
        app.update_scroll_bounds(content_height, viewport);

        terminal.draw(|frame| ui::render(frame, app))?;

        // Tick events keep this loop turning while requests are in flight.
        match events.next().await {
            Some(action) => app.handle_action(action),
            None => break,
        }
        while let Some(action) = events.try_next() {
            app.handle_action(action);
        }
        app.poll_events();
    }

    info!("TUI exited normally");
    Ok(())
}
