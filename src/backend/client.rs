use std::fmt;

use async_trait::async_trait;

use super::types::{LessonSummary, SessionSnapshot, SubmitResponse};

/// Errors that can occur while talking to the backend.
/// None of these are retried: a submitted command is graded, so resending it is not safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend misconfigured (bad URL).
    Config(String),
    /// Transport failure (connection refused, DNS, reset).
    Network(String),
    /// Backend answered with a non-success status.
    Api { status: u16, message: String },
    /// Response body did not match the expected shape.
    Parse(String),
    /// No answer within the configured request timeout.
    Timeout,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "backend error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "malformed response: {msg}"),
            BackendError::Timeout => write!(f, "backend unavailable: request timed out"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The grading/session service: curriculum, command evaluation, saves.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the name of the backend (for logs).
    fn name(&self) -> &str;

    async fn get_task(&self) -> Result<SessionSnapshot, BackendError>;

    async fn submit_command(&self, command: &str) -> Result<SubmitResponse, BackendError>;

    async fn get_hint(&self) -> Result<String, BackendError>;

    async fn list_lessons(&self) -> Result<Vec<LessonSummary>, BackendError>;

    async fn has_save(&self, lesson_id: &str) -> Result<bool, BackendError>;

    async fn continue_game(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError>;

    async fn start_new(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError>;

    async fn reset_progress(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError>;
}

/// One backend call, as data. The event loop hands these to [`dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    GetTask,
    SubmitCommand(String),
    GetHint,
    ListLessons,
    HasSave(String),
    ContinueGame(String),
    StartNew(String),
    ResetProgress(String),
}

impl BackendRequest {
    /// Wire name of the capability.
    pub fn capability(&self) -> &'static str {
        match self {
            BackendRequest::GetTask => "get_task",
            BackendRequest::SubmitCommand(_) => "submit_command",
            BackendRequest::GetHint => "get_hint",
            BackendRequest::ListLessons => "list_lessons",
            BackendRequest::HasSave(_) => "has_save",
            BackendRequest::ContinueGame(_) => "continue_game",
            BackendRequest::StartNew(_) => "start_new",
            BackendRequest::ResetProgress(_) => "reset_progress",
        }
    }
}

/// Successful answer to a [`BackendRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    /// `get_task`, `continue_game`, `start_new`, `reset_progress`
    Snapshot(SessionSnapshot),
    Turn(SubmitResponse),
    Hint(String),
    Lessons(Vec<LessonSummary>),
    HasSave(bool),
}

/// Runs `request` against `backend`.
pub async fn dispatch(
    backend: &dyn Backend,
    request: &BackendRequest,
) -> Result<BackendReply, BackendError> {
    match request {
        BackendRequest::GetTask => backend.get_task().await.map(BackendReply::Snapshot),
        BackendRequest::SubmitCommand(cmd) => {
            backend.submit_command(cmd).await.map(BackendReply::Turn)
        }
        BackendRequest::GetHint => backend.get_hint().await.map(BackendReply::Hint),
        BackendRequest::ListLessons => backend.list_lessons().await.map(BackendReply::Lessons),
        BackendRequest::HasSave(id) => backend.has_save(id).await.map(BackendReply::HasSave),
        BackendRequest::ContinueGame(id) => {
            backend.continue_game(id).await.map(BackendReply::Snapshot)
        }
        BackendRequest::StartNew(id) => backend.start_new(id).await.map(BackendReply::Snapshot),
        BackendRequest::ResetProgress(id) => {
            backend.reset_progress(id).await.map(BackendReply::Snapshot)
        }
    }
}
