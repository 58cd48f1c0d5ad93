//! # Application State
//!
//! Everything the session client knows, in one value owned by the event
//! loop. No module-level state: tests build an `App` and drive it through
//! `update()` without a terminal.
//!
//! ```text
//! App
//! ├── line: LineBuffer               // command being edited
//! ├── history: HistoryStore          // submitted commands
//! ├── turn: TurnState                // Idle | AwaitingResponse
//! ├── next_turn_id: u64              // monotonic request tag
//! ├── snapshot: Option<SessionSnapshot>  // backend state mirror
//! ├── snapshot_rev: u64              // bumps on every mirror update
//! ├── feedback: Option<Feedback>     // last grading signal
//! ├── hint: Option<String>           // hint for the current task
//! ├── lessons: Vec<LessonSummary>    // catalog, once listed
//! ├── selected_lesson: Option<String>
//! ├── saves: HashMap<String, bool>   // has_save answers per lesson
//! ├── auto_resume: bool              // chain has_save → continue/start
//! ├── prompt_shown: bool             // a live input line is on screen
//! ├── render: RenderAdapter          // queued terminal ops
//! ├── diagnostics: DiagnosticSink
//! └── clipboard_policy: ClipboardPolicy
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;

use crate::backend::{BackendRequest, Feedback, LessonSummary, SessionSnapshot};
use crate::core::clipboard::ClipboardPolicy;
use crate::core::config::ResolvedConfig;
use crate::core::diagnostics::DiagnosticSink;
use crate::core::history::HistoryStore;
use crate::core::line_buffer::LineBuffer;
use crate::core::render::RenderAdapter;

/// Directory shown in the prompt before the backend has reported one.
pub const DEFAULT_CWD: &str = "~";

/// The turn machine. At most one backend request is ever outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse { turn_id: u64, request: BackendRequest },
}

pub struct App {
    pub line: LineBuffer,
    pub history: HistoryStore,
    pub turn: TurnState,
    pub next_turn_id: u64,
    pub snapshot: Option<SessionSnapshot>,
    pub snapshot_rev: u64,
    pub feedback: Option<Feedback>,
    pub hint: Option<String>,
    pub lessons: Vec<LessonSummary>,
    pub selected_lesson: Option<String>,
    pub saves: HashMap<String, bool>,
    pub auto_resume: bool,
    pub prompt_shown: bool,
    pub render: RenderAdapter,
    pub diagnostics: DiagnosticSink,
    pub clipboard_policy: ClipboardPolicy,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            history: HistoryStore::new(),
            turn: TurnState::Idle,
            next_turn_id: 1,
            snapshot: None,
            snapshot_rev: 0,
            feedback: None,
            hint: None,
            lessons: Vec::new(),
            selected_lesson: None,
            saves: HashMap::new(),
            auto_resume: false,
            prompt_shown: false,
            render: RenderAdapter::new(),
            diagnostics: DiagnosticSink::new(),
            clipboard_policy: ClipboardPolicy::default(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            history: HistoryStore::with_limit(config.history_limit),
            selected_lesson: config.lesson.clone(),
            clipboard_policy: config.clipboard_policy,
            ..Self::new()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.turn == TurnState::Idle
    }

    pub fn cwd(&self) -> &str {
        self.snapshot
            .as_ref()
            .map(|s| s.cwd.as_str())
            .unwrap_or(DEFAULT_CWD)
    }

    /// Window title mirroring the task and progress.
    pub fn title(&self) -> String {
        match &self.snapshot {
            Some(s) => format!(
                "Linux Trainer | {} | {}/{} ({}%)",
                s.task.title,
                s.progress.index,
                s.progress.total,
                s.progress.percent()
            ),
            None => "Linux Trainer".to_string(),
        }
    }

    /// Replaces the mirrored snapshot. Returns true when the task changed
    /// from one that was already shown.
    pub fn mirror(&mut self, snapshot: SessionSnapshot) -> bool {
        let advanced = self
            .snapshot
            .as_ref()
            .is_some_and(|old| old.task.id != snapshot.task.id);
        if advanced {
            self.hint = None;
        }
        self.snapshot = Some(snapshot);
        self.snapshot_rev += 1;
        advanced
    }

    /// Claims the in-flight slot for `request`. Returns its turn id.
    pub fn begin_turn(&mut self, request: BackendRequest) -> u64 {
        let turn_id = self.next_turn_id;
        self.next_turn_id += 1;
        self.turn = TurnState::AwaitingResponse { turn_id, request };
        turn_id
    }
}
