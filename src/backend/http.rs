//! HTTP binding of the backend capability surface.
//!
//! Every capability is `POST {base_url}/{capability}` with a small JSON body
//! and a JSON answer in the shapes of [`super::types`].

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::client::{Backend, BackendError};
use super::types::{
    CommandBody, EmptyBody, HasSaveResponse, HintResponse, LessonBody, LessonSummary,
    LessonsResponse, SessionSnapshot, SubmitResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8765/api";

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<B, R>(&self, capability: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, capability);
        debug!("Backend request: POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    BackendError::Config(e.to_string())
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        debug!("Backend response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend error on {}: {} - {}", capability, status, message);
            return Err(BackendError::Api { status, message });
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Malformed {} response: {}", capability, e);
            BackendError::Parse(e.to_string())
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn get_task(&self) -> Result<SessionSnapshot, BackendError> {
        self.call("get_task", &EmptyBody {}).await
    }

    async fn submit_command(&self, command: &str) -> Result<SubmitResponse, BackendError> {
        info!("Submitting command ({} chars)", command.chars().count());
        self.call("submit_command", &CommandBody { command }).await
    }

    async fn get_hint(&self) -> Result<String, BackendError> {
        let resp: HintResponse = self.call("get_hint", &EmptyBody {}).await?;
        Ok(resp.hint)
    }

    async fn list_lessons(&self) -> Result<Vec<LessonSummary>, BackendError> {
        let resp: LessonsResponse = self.call("list_lessons", &EmptyBody {}).await?;
        Ok(resp.lessons)
    }

    async fn has_save(&self, lesson_id: &str) -> Result<bool, BackendError> {
        let resp: HasSaveResponse = self.call("has_save", &LessonBody { lesson_id }).await?;
        Ok(resp.has_save)
    }

    async fn continue_game(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError> {
        self.call("continue_game", &LessonBody { lesson_id }).await
    }

    async fn start_new(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError> {
        self.call("start_new", &LessonBody { lesson_id }).await
    }

    async fn reset_progress(&self, lesson_id: &str) -> Result<SessionSnapshot, BackendError> {
        self.call("reset_progress", &LessonBody { lesson_id }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new(Some("http://localhost:9000/api/".to_string()));
        assert_eq!(backend.base_url(), "http://localhost:9000/api");
    }

    #[test]
    fn test_default_base_url() {
        let backend = HttpBackend::new(None);
        assert_eq!(backend.base_url(), DEFAULT_BASE_URL);
    }
}
