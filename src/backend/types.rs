use serde::{Deserialize, Serialize};

/// The exercise the student is currently on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub prompt: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the current task
    pub index: u32,
    pub total: u32,
    pub correct: u32,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_title: Option<String>,
}

impl Progress {
    /// Share of tasks already behind the student, rounded to a whole percent.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let done = self.index.saturating_sub(1) as f64;
        ((done / self.total as f64) * 100.0).round() as u32
    }

    pub fn summary(&self) -> String {
        format!(
            "Task {} / {} | Correct: {} | Attempts: {}",
            self.index, self.total, self.correct, self.attempts
        )
    }
}

/// Backend-owned session state, mirrored read-only by the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub task: Task,
    pub cwd: String,
    pub progress: Progress,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Warn,
    Error,
}

/// Grading signal attached to a submitted command. Not an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub code: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FeedbackKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Feedback {
    pub const OK: &'static str = "OK";

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub terminal_lines: Vec<String>,
    pub feedback: Feedback,
    pub task: Task,
    pub cwd: String,
    pub progress: Progress,
}

impl SubmitResponse {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            task: self.task.clone(),
            cwd: self.cwd.clone(),
            progress: self.progress.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HintResponse {
    pub hint: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LessonsResponse {
    pub lessons: Vec<LessonSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HasSaveResponse {
    pub has_save: bool,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Serialize, Debug)]
pub(crate) struct CommandBody<'a> {
    pub command: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct LessonBody<'a> {
    pub lesson_id: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct EmptyBody {}
