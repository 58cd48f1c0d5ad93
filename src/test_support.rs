//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Mutex, mpsc};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::backend::{
    Backend, BackendError, Feedback, LessonSummary, Progress, SessionSnapshot,
    SubmitResponse, Task,
};
use crate::core::action::{Action, update};
use crate::core::state::App;

/// An in-memory backend that answers every capability from a fixed
/// snapshot and records what it was asked.
pub struct ScriptedBackend {
    snapshot: SessionSnapshot,
    failure: Option<BackendError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot,
            failure: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `err`.
    pub fn failing(err: BackendError) -> Self {
        Self {
            failure: Some(err),
            ..Self::new(sample_snapshot("/home/student"))
        }
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: String) -> Result<(), BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn get_task(&self) -> Result<SessionSnapshot, BackendError> {
        self.enter("get_task".into()).await?;
        Ok(self.snapshot.clone())
    }

    async fn submit_command(&self, command: &str) -> Result<SubmitResponse, BackendError> {
        self.enter(format!("submit_command:{command}")).await?;
        Ok(SubmitResponse {
            terminal_lines: vec![command.to_string()],
            feedback: ok_feedback(),
            task: self.snapshot.task.clone(),
            cwd: self.snapshot.cwd.clone(),
            progress: self.snapshot.progress.clone(),
        })
    }

    async fn get_hint(&self) -> Result<String, BackendError> {
        self.enter("get_hint".into()).await?;
        Ok("try pwd".to_string())
    }

    async fn list_lessons(&self) -> Result<Vec<LessonSummary>, BackendError> {
        self.enter("list_lessons".into()).await?;
        Ok(vec![LessonSummary {
            id: "01_paths".into(),
            title: "Paths".into(),
        }])
    }

    async fn has_save(&self, lesson_id: &str) -> Result<bool, BackendError> {
        self.enter(format!("has_save:{lesson_id}")).await?;
        Ok(true)
    }

    async fn continue_game(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError> {
        self.enter(format!("continue_game:{lesson_id}")).await?;
        Ok(self.snapshot.clone())
    }

    async fn start_new(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError> {
        self.enter(format!("start_new:{lesson_id}")).await?;
        Ok(self.snapshot.clone())
    }

    async fn reset_progress(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError> {
        self.enter(format!("reset_progress:{lesson_id}")).await?;
        Ok(self.snapshot.clone())
    }
}

fn ok_feedback() -> Feedback {
    Feedback {
        code: Feedback::OK.to_string(),
        kind: None,
        text: None,
    }
}

/// First task of a four-task lesson, at `cwd`.
pub fn sample_snapshot(cwd: &str) -> SessionSnapshot {
    SessionSnapshot {
        task: Task {
            id: "t1".into(),
            title: "Where am I".into(),
            prompt: "Print the working directory.".into(),
        },
        cwd: cwd.to_string(),
        progress: Progress {
            index: 1,
            total: 4,
            ..Default::default()
        },
    }
}

/// A submit answer that stays on the sample task.
pub fn submit_response(lines: &[&str], code: &str, cwd: &str) -> SubmitResponse {
    let snapshot = sample_snapshot(cwd);
    SubmitResponse {
        terminal_lines: lines.iter().map(|l| l.to_string()).collect(),
        feedback: Feedback {
            code: code.to_string(),
            kind: None,
            text: None,
        },
        task: snapshot.task,
        cwd: snapshot.cwd,
        progress: snapshot.progress,
    }
}

/// A fresh App, nothing loaded.
pub fn test_app() -> App {
    App::new()
}

/// An App with the sample task loaded, its prompt on screen and no queued ops.
pub fn ready_app(cwd: &str) -> App {
    let mut app = App::new();
    app.mirror(sample_snapshot(cwd));
    app.render.prompt(cwd);
    app.prompt_shown = true;
    app.render.drain();
    app
}

/// Types `text` one key at a time.
pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        update(app, Action::InsertChar(c));
    }
}

/// Waits for the next action a background task sends back.
pub async fn next_action(rx: &mpsc::Receiver<Action>) -> Action {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(action) = rx.try_recv() {
            return action;
        }
        assert!(Instant::now() < deadline, "no background result");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
