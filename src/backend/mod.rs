pub mod client;
pub mod http;
pub mod types;

pub use client::{Backend, BackendError, BackendReply, BackendRequest, dispatch};
pub use http::HttpBackend;
pub use types::{
    Feedback, FeedbackKind, LessonSummary, Progress, SessionSnapshot, SubmitResponse, Task,
};
