//! # Actions
//!
//! Everything that can happen in the trainer becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! Backend answers? That's `Action::BackendReplied { turn_id, result }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, queues terminal ops on `app.render`, and returns the `Effect`
//! the event loop must perform. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! ## Turns
//!
//! ```text
//!   Idle ── Submit / lesson key ──▶ AwaitingResponse { turn_id } ── reply(turn_id) ──▶ Idle
//! ```
//!
//! While a request is outstanding every user-originated action is dropped,
//! so a second Enter can never put a second request on the wire. Replies
//! tagged with any other turn id are stale and ignored.

use log::{debug, info, warn};

use crate::backend::{BackendError, BackendReply, BackendRequest, SubmitResponse};
use crate::core::clipboard::{self, ClipboardError, ClipboardPolicy};
use crate::core::line_buffer::Redraw;
use crate::core::state::{App, TurnState};

const BANNER: &[&str] = &[
    "Linux Trainer - a local training game.",
    "Type a command and press Enter.",
    "F1 hint | F2 lessons | F3 task | F4 next lesson | F5 continue | F6 start new | F8 reset | F9 save? | Ctrl+D quit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Print the banner and load the first task.
    Start,

    // Line editing
    InsertChar(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    HistoryPrevious,
    HistoryNext,
    Submit,
    /// Ctrl+D: quit on an empty line, delete under the cursor otherwise.
    EndOfInput,

    // Paste
    /// Text delivered by the terminal itself (bracketed paste).
    Paste(String),
    /// Ctrl+V / Shift+Insert: read the system clipboard.
    PasteRequested,
    ClipboardRead(Result<String, ClipboardError>),

    // Lesson lifecycle
    RequestHint,
    ListLessons,
    ShowTask,
    SelectNextLesson,
    CheckSave,
    ContinueLesson,
    StartNewLesson,
    ResetProgress,

    BackendReplied {
        turn_id: u64,
        result: Result<BackendReply, BackendError>,
    },
    Quit,
}

impl Action {
    /// Actions that come from the user's keyboard and need an idle session.
    fn needs_idle(&self) -> bool {
        !matches!(
            self,
            Action::Start
                | Action::EndOfInput
                | Action::ClipboardRead(_)
                | Action::BackendReplied { .. }
                | Action::Quit
        )
    }
}

/// Side effects the event loop performs after `update()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Run `request` in the background and report back tagged with `turn_id`.
    Dispatch { turn_id: u64, request: BackendRequest },
    /// Read the system clipboard in the background.
    ReadClipboard,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    if action.needs_idle() && !app.is_idle() {
        debug!("Ignoring {:?} while awaiting a response", action);
        return Effect::None;
    }

    match action {
        Action::Start => start(app),

        Action::InsertChar(c) => redraw(app, |app| app.line.insert(c.encode_utf8(&mut [0; 4]))),
        Action::Backspace => redraw(app, |app| app.line.backspace()),
        Action::Delete => redraw(app, |app| app.line.delete()),
        Action::CursorLeft => redraw(app, |app| app.line.move_left()),
        Action::CursorRight => redraw(app, |app| app.line.move_right()),
        Action::CursorHome => redraw(app, |app| app.line.move_home()),
        Action::CursorEnd => redraw(app, |app| app.line.move_end()),
        Action::HistoryPrevious => redraw(app, |app| {
            let live = app.line.as_str().to_string();
            match app.history.recall_previous(&live).map(str::to_string) {
                Some(entry) => app.line.replace_all(&entry),
                None => Redraw::None,
            }
        }),
        Action::HistoryNext => redraw(app, |app| match app.history.recall_next() {
            Some(text) => app.line.replace_all(&text),
            None => Redraw::None,
        }),
        Action::Submit => submit(app),
        Action::EndOfInput => {
            if app.line.is_empty() {
                Effect::Quit
            } else if app.is_idle() {
                redraw(app, |app| app.line.delete())
            } else {
                Effect::None
            }
        }

        Action::Paste(text) => paste(app, Ok(text)),
        Action::PasteRequested => Effect::ReadClipboard,
        Action::ClipboardRead(read) => {
            if !app.is_idle() {
                debug!("Dropping clipboard read that finished mid-turn");
                return Effect::None;
            }
            paste(app, read)
        }

        Action::RequestHint => dispatch(app, BackendRequest::GetHint),
        Action::ListLessons => dispatch(app, BackendRequest::ListLessons),
        Action::ShowTask => {
            let mut lines = task_header(app);
            if lines.is_empty() {
                lines.push("No task loaded yet.".to_string());
            }
            print_block(app, &lines);
            Effect::None
        }
        Action::SelectNextLesson => {
            select_next_lesson(app);
            Effect::None
        }
        Action::CheckSave => lesson_dispatch(app, BackendRequest::HasSave),
        Action::ContinueLesson => lesson_dispatch(app, BackendRequest::ContinueGame),
        Action::StartNewLesson => lesson_dispatch(app, BackendRequest::StartNew),
        Action::ResetProgress => lesson_dispatch(app, BackendRequest::ResetProgress),

        Action::BackendReplied { turn_id, result } => on_reply(app, turn_id, result),
        Action::Quit => Effect::Quit,
    }
}

fn redraw(app: &mut App, edit: impl FnOnce(&mut App) -> Redraw) -> Effect {
    let redraw = edit(app);
    app.render.apply(&redraw);
    Effect::None
}

fn start(app: &mut App) -> Effect {
    for line in BANNER {
        app.render.line(line);
    }
    app.render.blank_line();

    match app.selected_lesson.clone() {
        Some(lesson_id) => {
            app.auto_resume = true;
            dispatch(app, BackendRequest::HasSave(lesson_id))
        }
        None => dispatch(app, BackendRequest::GetTask),
    }
}

fn submit(app: &mut App) -> Effect {
    let command = app.line.as_str().trim_end().to_string();
    app.history.push(&command);
    app.history.reset_browsing();
    app.render.detach(&app.line);
    app.line.take();
    // Empty lines go to the backend too
    app.prompt_shown = false;
    dispatch(app, BackendRequest::SubmitCommand(command))
}

fn dispatch(app: &mut App, request: BackendRequest) -> Effect {
    let turn_id = app.begin_turn(request.clone());
    info!("Dispatching {} (turn {})", request.capability(), turn_id);
    Effect::Dispatch { turn_id, request }
}

fn lesson_dispatch(app: &mut App, make: fn(String) -> BackendRequest) -> Effect {
    match app.selected_lesson.clone() {
        Some(lesson_id) => dispatch(app, make(lesson_id)),
        None => {
            print_block(
                app,
                &["No lesson selected. Press F2 to list lessons and F4 to pick one.".to_string()],
            );
            Effect::None
        }
    }
}

fn paste(app: &mut App, read: Result<String, ClipboardError>) -> Effect {
    match clipboard::paste_into(&mut app.line, read) {
        Ok(redraw) => app.render.apply(&redraw),
        Err(err) => {
            let line = app.diagnostics.clipboard(&err).line();
            if app.clipboard_policy == ClipboardPolicy::Report {
                print_block(app, &[line]);
            }
        }
    }
    Effect::None
}

fn select_next_lesson(app: &mut App) {
    if app.lessons.is_empty() {
        print_block(app, &["Lesson list not loaded. Press F2 first.".to_string()]);
        return;
    }
    let next = app
        .selected_lesson
        .as_ref()
        .and_then(|id| app.lessons.iter().position(|l| &l.id == id))
        .map(|i| (i + 1) % app.lessons.len())
        .unwrap_or(0);
    let lesson = app.lessons[next].clone();
    app.selected_lesson = Some(lesson.id.clone());
    print_block(
        app,
        &[format!("Selected lesson: {} - {}", lesson.id, lesson.title)],
    );
}

fn on_reply(app: &mut App, turn_id: u64, result: Result<BackendReply, BackendError>) -> Effect {
    let request = match &app.turn {
        TurnState::AwaitingResponse {
            turn_id: current,
            request,
        } if *current == turn_id => request.clone(),
        _ => {
            warn!("Dropping stale reply for turn {}", turn_id);
            return Effect::None;
        }
    };
    app.turn = TurnState::Idle;

    match result {
        Ok(reply) => apply_reply(app, request, reply),
        Err(err) => {
            fail(app, &request, &err);
            Effect::None
        }
    }
}

fn apply_reply(app: &mut App, request: BackendRequest, reply: BackendReply) -> Effect {
    match (request, reply) {
        (BackendRequest::SubmitCommand(_), BackendReply::Turn(resp)) => finish_turn(app, resp),
        (_, BackendReply::Snapshot(snapshot)) => {
            app.hint = None;
            app.mirror(snapshot);
            let mut lines = task_header(app);
            lines.push(String::new());
            print_block(app, &lines);
        }
        (_, BackendReply::Hint(hint)) => {
            let line = format!("Hint: {hint}");
            app.hint = Some(hint);
            print_block(app, &[line]);
        }
        (_, BackendReply::Lessons(lessons)) => {
            app.lessons = lessons;
            let lines = lesson_lines(app);
            print_block(app, &lines);
        }
        (BackendRequest::HasSave(lesson_id), BackendReply::HasSave(has_save)) => {
            app.saves.insert(lesson_id.clone(), has_save);
            if std::mem::take(&mut app.auto_resume) {
                let next = if has_save {
                    BackendRequest::ContinueGame(lesson_id)
                } else {
                    BackendRequest::StartNew(lesson_id)
                };
                return dispatch(app, next);
            }
            let status = if has_save {
                "saved progress found"
            } else {
                "no saved progress"
            };
            print_block(app, &[format!("Lesson {lesson_id}: {status}")]);
        }
        (request, reply) => {
            let err = BackendError::Parse(format!("unexpected reply {reply:?}"));
            fail(app, &request, &err);
        }
    }
    Effect::None
}

/// Prints a turn's output, then exactly one blank line and one prompt.
fn finish_turn(app: &mut App, resp: SubmitResponse) {
    for line in &resp.terminal_lines {
        app.render.line(line);
    }
    if !resp.feedback.is_ok() {
        app.render.line(&format!("[{}]", resp.feedback.code));
    }

    // A new task shows up in the window title; F3 prints it
    let task_id = resp.task.id.clone();
    if app.mirror(resp.snapshot()) {
        info!("Advanced to task {}", task_id);
    }
    app.feedback = Some(resp.feedback);

    app.render.blank_line();
    let cwd = app.cwd().to_string();
    app.render.prompt(&cwd);
    app.prompt_shown = true;
}

fn fail(app: &mut App, request: &BackendRequest, err: &BackendError) {
    app.auto_resume = false;
    let mut lines = vec![app.diagnostics.backend(request.capability(), err).line()];
    if matches!(request, BackendRequest::SubmitCommand(_)) {
        lines.push(String::new());
    }
    print_block(app, &lines);
}

/// Prints `lines` below the live input line, then re-prints the prompt and
/// whatever was being typed.
fn print_block(app: &mut App, lines: &[String]) {
    if app.prompt_shown {
        app.render.detach(&app.line);
    }
    for line in lines {
        app.render.line(line);
    }
    let cwd = app.cwd().to_string();
    app.render.reattach(&cwd, &app.line);
    app.prompt_shown = true;
}

fn task_header(app: &App) -> Vec<String> {
    let Some(snapshot) = &app.snapshot else {
        return Vec::new();
    };
    let mut lines = vec![format!("== {}: {} ==", snapshot.task.id, snapshot.task.title)];
    lines.extend(snapshot.task.prompt.lines().map(str::to_string));
    lines.push(snapshot.progress.summary());
    lines
}

fn lesson_lines(app: &App) -> Vec<String> {
    if app.lessons.is_empty() {
        return vec!["No lessons available.".to_string()];
    }
    let mut lines = vec!["Lessons:".to_string()];
    for lesson in &app.lessons {
        let marker = if app.selected_lesson.as_deref() == Some(lesson.id.as_str()) {
            '*'
        } else {
            ' '
        };
        lines.push(format!("{marker} {} - {}", lesson.id, lesson.title));
    }
    lines
}
