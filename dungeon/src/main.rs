//! AI Dungeon Master TUI application.
//!
//! A vim-style terminal interface for a chat-driven adventure run by an
//! AI Dungeon Master. Player input goes to the model; replies come back
//! as narration plus an optional state delta applied in memory.

mod app;
mod events;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dungeon_core::{GameSession, SessionConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::time::Duration;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Check for API key
    if std::env::var("GEMINI_API_KEY").is_err() {
        eprintln!("Error: GEMINI_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
        std::process::exit(1);
    }

    // Tracing goes to stderr; visible after the alternate screen exits,
    // or redirect with 2>dungeon.log
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let session = match GameSession::new(SessionConfig::new()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to create game session: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(location = session.location_name(), "Game session ready");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, App::new(session)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    // Track pending input for async processing
    let mut pending_input: Option<String> = None;

    loop {
        // Render
        terminal.draw(|f| render(f, &app))?;

        // Process any pending input asynchronously
        if let Some(input) = pending_input.take() {
            app.processing = true;
            terminal.draw(|f| render(f, &app))?;

            match app.session.player_action(&input).await {
                Ok(outcome) => {
                    if outcome.warnings.is_empty() {
                        app.clear_status();
                    } else {
                        let text = outcome
                            .warnings
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; ");
                        app.set_status(text);
                    }
                    if app.scroll_locked_to_bottom {
                        app.scroll_to_bottom();
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Turn processing failed");
                    app.set_status(format!("Error: {e}"));
                }
            }
            app.processing = false;
        }

        // Poll for events with a timeout so redraws stay responsive
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;

            // Capture the input buffer before handling the event; submit
            // clears it
            let input_before = if app.input_mode == app::InputMode::Insert {
                Some(app.input_buffer().to_string())
            } else {
                None
            };

            match handle_event(&mut app, ev) {
                EventResult::Quit => {
                    return Ok(());
                }
                EventResult::ProcessInput => {
                    if let Some(input) = input_before {
                        let input = input.trim().to_string();
                        if !input.is_empty() {
                            pending_input = Some(input);
                        }
                    }
                }
                EventResult::NeedsRedraw | EventResult::Continue => {
                    // Just continue the loop
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
