//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, shutdown signals and a periodic tick. Loads
//! run inline: the placeholder frame is drawn, then the fetch is awaited.

use crate::api::ContentSource;
use crate::app::App;
use crate::browser::{Outcome, Pending};
use crate::navigation::Action;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::{handle_key, handle_mouse};
use super::render::render;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs the TUI application until the user quits or a signal arrives.
///
/// Uses `tokio::select!` to multiplex three event sources:
/// - **Signals**: SIGTERM/SIGINT end the session
/// - **Terminal input**: key presses and mouse events from crossterm
/// - **Periodic tick**: 250ms timer for status expiry
///
/// Every way out except a panic saves the article cache: quit does it as
/// one of its effects, and signals, closed input or terminal errors do it
/// on the way out.
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run<S: ContentSource>(app: &mut App<S>) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app).await;
    restore_terminal(terminal)?;
    result
}

async fn event_loop<S: ContentSource>(terminal: &mut Term, app: &mut App<S>) -> Result<()> {
    let result = drive(terminal, app).await;
    end_session(app, result)
}

/// Save the cache unless the quit effects already did.
fn end_session<S: ContentSource>(app: &mut App<S>, result: Result<Outcome>) -> Result<()> {
    if !matches!(result, Ok(Outcome::Exit)) {
        app.browser.persist();
    }
    result.map(|_| ())
}

/// Returns [`Outcome::Exit`] after a quit and [`Outcome::Continue`] when the
/// session ended any other way.
async fn drive<S: ContentSource>(terminal: &mut Term, app: &mut App<S>) -> Result<Outcome> {
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    // On non-Unix platforms, these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let pending = app.browser.begin_initial();
    if run_pending(terminal, app, pending).await? == Outcome::Exit {
        return Ok(Outcome::Exit);
    }

    loop {
        // Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        let actions: Vec<Action> = tokio::select! {
            biased;  // Process in order listed for predictable behavior

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key.code, key.modifiers).into_iter().collect()
                }
                Some(Ok(Event::Mouse(mouse))) => handle_mouse(app, mouse),
                Some(Ok(Event::Resize(..))) => {
                    app.needs_redraw = true;
                    Vec::new()
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Terminal input error");
                    Vec::new()
                }
                None => {
                    tracing::info!("Terminal input closed, shutting down");
                    break;
                }
            },

            _ = tick_interval.tick() => {
                if app.clear_expired_status() {
                    app.needs_redraw = true;
                }
                Vec::new()
            }
        };

        for action in actions {
            let pending = app.browser.begin(action);
            if run_pending(terminal, app, pending).await? == Outcome::Exit {
                return Ok(Outcome::Exit);
            }
        }
    }

    Ok(Outcome::Continue)
}

/// Draw the loading placeholder if there is one, then run the effects.
async fn run_pending<S: ContentSource>(
    terminal: &mut Term,
    app: &mut App<S>,
    pending: Pending,
) -> Result<Outcome> {
    if pending.shows_placeholder() {
        app.sync_with_browser();
        terminal.draw(|f| render(f, app))?;
    }
    let outcome = app.browser.finish(pending).await;
    app.sync_with_browser();
    Ok(outcome)
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::FixedSource;
    use crate::browser::Browser;
    use crate::keybindings::KeybindingRegistry;
    use crate::snapshot::DiskSnapshot;
    use std::path::Path;

    async fn app_saving_to(path: &Path) -> App<FixedSource> {
        let mut browser =
            Browser::new(FixedSource { len: 2 }, 40).with_snapshot(DiskSnapshot::new(path));
        browser.start().await;
        App::new(
            browser,
            KeybindingRegistry::new(),
            "https://www.tabnews.com.br".to_string(),
        )
    }

    #[tokio::test]
    async fn test_closed_input_saves_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut app = app_saving_to(&path).await;

        end_session(&mut app, Ok(Outcome::Continue)).unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_terminal_error_saves_cache_and_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut app = app_saving_to(&path).await;

        let result = end_session(&mut app, Err(anyhow::anyhow!("draw failed")));
        assert_eq!(result.unwrap_err().to_string(), "draw failed");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_quit_is_not_saved_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let mut app = app_saving_to(&path).await;

        // Quit saves through its own effects; nothing else writes afterwards
        end_session(&mut app, Ok(Outcome::Exit)).unwrap();
        assert!(!path.exists());
    }
}
