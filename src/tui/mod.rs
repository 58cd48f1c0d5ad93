//! # TUI Adapter
//!
//! The crossterm-specific layer. Puts the terminal in raw mode, turns key
//! presses into `core::Action` values, runs `Effect`s in the background and
//! writes the ops `update()` queued.
//!
//! This is the only module that knows about crossterm and arboard.
//!
//! ## Loop
//!
//! ```text
//!   ┌──────────── flush queued ops + window title ◀──────────┐
//!   ▼                                                         │
//! poll keys ──▶ update() ──▶ Effect::Dispatch ──▶ tokio task ─┤
//!                  ▲                                          │
//!                  └──── rx: BackendReplied / ClipboardRead ◀─┘
//! ```
//!
//! The loop never awaits. Backend calls and clipboard reads run on the tokio
//! runtime and report back through an `mpsc` channel, so the prompt stays
//! responsive while a request is outstanding.

mod clipboard;
mod event;
mod sink;

pub use clipboard::SystemClipboard;
pub use sink::CrosstermSink;

use log::{debug, info, warn};
use std::io::{self, Write, stdout};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::backend::{Backend, BackendError, BackendRequest, HttpBackend, dispatch};
use crate::core::action::{Action, Effect, update};
use crate::core::clipboard::ClipboardSource;
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::event::{drain_pending, poll_event_timeout};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct TerminalModeGuard;

impl TerminalModeGuard {
    pub fn new() -> std::io::Result<Self> {
        enable_raw_mode()?;
        // Terminals without the Kitty protocol ignore the flags
        execute!(
            stdout(),
            EnableBracketedPaste,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (raw, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leaves raw mode and pops the input modes. Safe to call more than once.
pub fn restore_terminal() {
    let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableBracketedPaste);
    let _ = disable_raw_mode();
}

/// Where effects run: the backend, the clipboard, and the channel that
/// carries their results back to the loop.
pub struct Runner {
    backend: Arc<dyn Backend>,
    clipboard: Arc<dyn ClipboardSource>,
    request_timeout: Duration,
    tx: mpsc::Sender<Action>,
}

impl Runner {
    pub fn new(
        backend: Arc<dyn Backend>,
        clipboard: Arc<dyn ClipboardSource>,
        request_timeout: Duration,
        tx: mpsc::Sender<Action>,
    ) -> Self {
        Self {
            backend,
            clipboard,
            request_timeout,
            tx,
        }
    }

    /// Applies `action` and starts whatever it asks for. Returns true to quit.
    pub fn step(&self, app: &mut App, action: Action) -> bool {
        match update(app, action) {
            Effect::None => false,
            Effect::Quit => true,
            Effect::Dispatch { turn_id, request } => {
                self.spawn_request(turn_id, request);
                false
            }
            Effect::ReadClipboard => {
                self.spawn_clipboard_read();
                false
            }
        }
    }

    fn spawn_request(&self, turn_id: u64, request: BackendRequest) {
        info!(
            "Spawning {} on {} (turn {})",
            request.capability(),
            self.backend.name(),
            turn_id
        );
        let backend = self.backend.clone();
        let timeout = self.request_timeout;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, dispatch(&*backend, &request))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "{} timed out after {:?} (turn {})",
                        request.capability(),
                        timeout,
                        turn_id
                    );
                    Err(BackendError::Timeout)
                }
            };
            if tx.send(Action::BackendReplied { turn_id, result }).is_err() {
                warn!("Failed to send reply for turn {}: receiver dropped", turn_id);
            }
        });
    }

    fn spawn_clipboard_read(&self) {
        let clipboard = self.clipboard.clone();
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let read = clipboard.read_text();
            if tx.send(Action::ClipboardRead(read)).is_err() {
                warn!("Failed to send clipboard read: receiver dropped");
            }
        });
    }
}

/// Writes the queued ops and, when the snapshot moved, the window title.
/// A failed write is recorded in the diagnostic sink before it is returned.
fn flush<W: Write>(
    sink: &mut CrosstermSink<W>,
    app: &mut App,
    title_rev: &mut Option<u64>,
) -> io::Result<()> {
    let mut write = || -> io::Result<()> {
        sink.emit(&app.render.drain())?;
        if *title_rev != Some(app.snapshot_rev) {
            sink.set_title(&app.title())?;
            *title_rev = Some(app.snapshot_rev);
        }
        Ok(())
    };
    write().inspect_err(|e| {
        app.diagnostics.terminal(e);
    })
}

pub fn run(config: ResolvedConfig) -> io::Result<()> {
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(Some(config.backend_url.clone())));
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        backend,
        Arc::new(SystemClipboard),
        config.request_timeout,
        tx,
    );
    let mut app = App::from_config(&config);
    info!(
        "Session starting against {} (lesson: {:?})",
        config.backend_url, app.selected_lesson
    );

    let _terminal_mode_guard = TerminalModeGuard::new()?;
    let mut sink = CrosstermSink::new(stdout());
    let mut title_rev = None;

    let mut should_quit = runner.step(&mut app, Action::Start);

    while !should_quit {
        flush(&mut sink, &mut app, &mut title_rev)?;

        // Drain every pending key before touching background results
        let first_event = poll_event_timeout(POLL_INTERVAL);
        for action in first_event.into_iter().chain(drain_pending()) {
            if runner.step(&mut app, action) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            debug!("Event loop received: {:?}", action);
            if runner.step(&mut app, action) {
                should_quit = true;
                break;
            }
        }
    }

    // Leave the shell prompt on a fresh line
    if app.prompt_shown {
        app.render.detach(&app.line);
    }
    flush(&mut sink, &mut app, &mut title_rev)?;
    info!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendReply;
    use crate::core::clipboard::ClipboardError;
    use crate::test_support::{
        ScriptedBackend, next_action, ready_app, sample_snapshot, type_text,
    };

    struct FixedClipboard(Result<String, ClipboardError>);

    impl ClipboardSource for FixedClipboard {
        fn read_text(&self) -> Result<String, ClipboardError> {
            self.0.clone()
        }
    }

    fn runner(
        backend: ScriptedBackend,
        clipboard: Result<String, ClipboardError>,
        timeout: Duration,
    ) -> (Runner, mpsc::Receiver<Action>) {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            Arc::new(backend),
            Arc::new(FixedClipboard(clipboard)),
            timeout,
            tx,
        );
        (runner, rx)
    }

    #[tokio::test]
    async fn test_submit_round_trip_through_runner() {
        let (runner, rx) = runner(
            ScriptedBackend::new(sample_snapshot("/home/student")),
            Err(ClipboardError::Empty),
            Duration::from_secs(5),
        );
        let mut app = ready_app("/home/student");
        type_text(&mut app, "pwd");
        assert!(!runner.step(&mut app, Action::Submit));
        assert!(!app.is_idle());

        let action = next_action(&rx).await;
        assert!(matches!(
            &action,
            Action::BackendReplied { turn_id: 1, result: Ok(BackendReply::Turn(resp)) }
                if resp.terminal_lines == ["pwd"]
        ));
        assert!(!runner.step(&mut app, action));
        assert!(app.is_idle());
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let backend = ScriptedBackend::new(sample_snapshot("/home/student"))
            .with_delay(Duration::from_secs(10));
        let (runner, rx) = runner(backend, Err(ClipboardError::Empty), Duration::from_millis(50));
        let mut app = ready_app("/home/student");
        runner.step(&mut app, Action::RequestHint);

        let action = next_action(&rx).await;
        assert_eq!(
            action,
            Action::BackendReplied {
                turn_id: 1,
                result: Err(BackendError::Timeout),
            }
        );
        runner.step(&mut app, action);
        assert!(app.is_idle());
        assert_eq!(app.diagnostics.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_clipboard_read_runs_off_loop() {
        let (runner, rx) = runner(
            ScriptedBackend::new(sample_snapshot("/home/student")),
            Ok("ls -la\n".to_string()),
            Duration::from_secs(5),
        );
        let mut app = ready_app("/home/student");
        runner.step(&mut app, Action::PasteRequested);

        let action = next_action(&rx).await;
        assert_eq!(action, Action::ClipboardRead(Ok("ls -la\n".to_string())));
        runner.step(&mut app, action);
        assert_eq!(app.line.as_str(), "ls -la");
    }

    struct BrokenTerminal;

    impl Write for BrokenTerminal {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_flush_sets_title_once_per_snapshot() {
        let mut sink = CrosstermSink::new(Vec::new());
        let mut app = ready_app("/home/student");
        app.render.line("hello");
        let mut title_rev = None;

        flush(&mut sink, &mut app, &mut title_rev).unwrap();
        assert_eq!(title_rev, Some(app.snapshot_rev));
        assert!(app.render.pending().is_empty());

        app.render.line("again");
        flush(&mut sink, &mut app, &mut title_rev).unwrap();
        assert!(app.diagnostics.recent().is_empty());
    }

    #[test]
    fn test_failed_terminal_write_reaches_diagnostics() {
        let mut sink = CrosstermSink::new(BrokenTerminal);
        let mut app = ready_app("/home/student");
        app.render.line("hello");

        let err = flush(&mut sink, &mut app, &mut None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(
            app.diagnostics.recent()[0].line(),
            "[error] terminal: tty gone"
        );
    }

    #[test]
    fn test_quit_stops_without_effects() {
        let (runner, rx) = runner(
            ScriptedBackend::new(sample_snapshot("/home/student")),
            Err(ClipboardError::Empty),
            Duration::from_secs(5),
        );
        let mut app = ready_app("/home/student");
        assert!(runner.step(&mut app, Action::Quit));
        assert!(rx.try_recv().is_err());
    }
}
