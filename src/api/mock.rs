//! Scripted [`Backend`] used by the unit tests.
//!
//! Each endpoint pops its next reply from a queue; an empty queue answers
//! with a transport error, which also ends voice loops in tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::api::client::{Backend, IngestPayload};
use crate::api::error::ApiError;
use crate::api::schema::{
    AskRequest, AskResponse, HistoryEntry, HistoryResponse, LanguageEntry, LanguagesResponse,
    MessageResponse, SpeechChatRequest, SpeechChatResponse,
};

type Queue<T> = Mutex<VecDeque<Result<T, ApiError>>>;
type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockBackend {
    languages: Queue<LanguagesResponse>,
    history: Queue<HistoryResponse>,
    clear_history: Queue<MessageResponse>,
    ask: Queue<AskResponse>,
    new_conversation: Queue<MessageResponse>,
    speech: Queue<SpeechChatResponse>,
    ingest: Queue<MessageResponse>,

    calls: Mutex<Vec<&'static str>>,
    asked: Mutex<Vec<AskRequest>>,
    speech_requests: Mutex<Vec<SpeechChatRequest>>,
    ingested: Mutex<Vec<IngestPayload>>,
    on_ask: Mutex<Option<Hook>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pop<T>(queue: &Queue<T>) -> Result<T, ApiError> {
    guard(queue)
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::Request("no scripted response".into())))
}

/// Error shaped like a 4xx/5xx reply carrying `{ "error": message }`.
pub fn backend_error(message: &str) -> ApiError {
    ApiError::Backend {
        status: 400,
        message: Some(message.to_string()),
    }
}

pub fn languages(names: &[&str]) -> LanguagesResponse {
    LanguagesResponse {
        languages: names
            .iter()
            .map(|n| LanguageEntry { name: n.to_string() })
            .collect(),
    }
}

pub fn history(entries: &[(&str, &str)]) -> HistoryResponse {
    HistoryResponse {
        history: entries
            .iter()
            .map(|(role, content)| HistoryEntry {
                role: role.to_string(),
                content: content.to_string(),
            })
            .collect(),
    }
}

pub fn answer(text: &str) -> AskResponse {
    AskResponse {
        answer: text.to_string(),
        sources: Some(vec![]),
        context: Some(String::new()),
    }
}

pub fn confirmed(message: Option<&str>) -> MessageResponse {
    MessageResponse {
        message: message.map(str::to_string),
    }
}

pub fn turn(user: Option<&str>, assistant: Option<&str>, status: &str) -> SpeechChatResponse {
    let status = serde_json::from_value(serde_json::Value::String(status.to_string()))
        .unwrap_or_default();
    SpeechChatResponse {
        user_message: user.map(str::to_string),
        assistant_response: assistant.map(str::to_string),
        audio_url: assistant.map(|_| "http://127.0.0.1:5000/static/reply.mp3".to_string()),
        status,
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_languages(&self, r: Result<LanguagesResponse, ApiError>) -> &Self {
        guard(&self.languages).push_back(r);
        self
    }

    pub fn push_history(&self, r: Result<HistoryResponse, ApiError>) -> &Self {
        guard(&self.history).push_back(r);
        self
    }

    pub fn push_clear_history(&self, r: Result<MessageResponse, ApiError>) -> &Self {
        guard(&self.clear_history).push_back(r);
        self
    }

    pub fn push_ask(&self, r: Result<AskResponse, ApiError>) -> &Self {
        guard(&self.ask).push_back(r);
        self
    }

    pub fn push_new_conversation(&self, r: Result<MessageResponse, ApiError>) -> &Self {
        guard(&self.new_conversation).push_back(r);
        self
    }

    pub fn push_speech(&self, r: Result<SpeechChatResponse, ApiError>) -> &Self {
        guard(&self.speech).push_back(r);
        self
    }

    pub fn push_ingest(&self, r: Result<MessageResponse, ApiError>) -> &Self {
        guard(&self.ingest).push_back(r);
        self
    }

    /// Run `hook` inside `ask`, before the reply is returned.
    pub fn on_ask(&self, hook: impl Fn() + Send + Sync + 'static) {
        *guard(&self.on_ask) = Some(Box::new(hook));
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        guard(&self.calls).iter().filter(|c| **c == endpoint).count()
    }

    pub fn total_calls(&self) -> usize {
        guard(&self.calls).len()
    }

    pub fn asked(&self) -> Vec<AskRequest> {
        guard(&self.asked).clone()
    }

    pub fn speech_requests(&self) -> Vec<SpeechChatRequest> {
        guard(&self.speech_requests).clone()
    }

    pub fn ingested(&self) -> Vec<IngestPayload> {
        guard(&self.ingested).clone()
    }

    fn record(&self, endpoint: &'static str) {
        guard(&self.calls).push(endpoint);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn available_languages(&self) -> Result<LanguagesResponse, ApiError> {
        self.record("languages");
        pop(&self.languages)
    }

    async fn history(&self) -> Result<HistoryResponse, ApiError> {
        self.record("history");
        pop(&self.history)
    }

    async fn clear_history(&self) -> Result<MessageResponse, ApiError> {
        self.record("clear_history");
        tokio::task::yield_now().await;
        pop(&self.clear_history)
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.record("ask");
        guard(&self.asked).push(request.clone());
        if let Some(hook) = guard(&self.on_ask).as_ref() {
            hook();
        }
        tokio::task::yield_now().await;
        pop(&self.ask)
    }

    async fn start_new_conversation(&self) -> Result<MessageResponse, ApiError> {
        self.record("new_conversation");
        tokio::task::yield_now().await;
        pop(&self.new_conversation)
    }

    async fn speech_chat(
        &self,
        request: &SpeechChatRequest,
    ) -> Result<SpeechChatResponse, ApiError> {
        self.record("speech");
        guard(&self.speech_requests).push(request.clone());
        tokio::task::yield_now().await;
        pop(&self.speech)
    }

    async fn ingest(&self, payload: IngestPayload) -> Result<MessageResponse, ApiError> {
        self.record("ingest");
        guard(&self.ingested).push(payload);
        pop(&self.ingest)
    }
}
