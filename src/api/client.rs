//! Core [`Backend`] trait and the [`HttpBackend`] implementation.
//!
//! `HttpBackend` speaks to the document-chat REST backend.  All connection
//! details come from [`BackendConfig`]; endpoint paths are fixed by the
//! backend's routing.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::schema::{
    AskRequest, AskResponse, ErrorBody, HistoryResponse, LanguagesResponse, MessageResponse,
    ProcessUrlRequest, ProcessVideoRequest, SpeechChatRequest, SpeechChatResponse,
};
use crate::config::BackendConfig;

// ---------------------------------------------------------------------------
// Endpoint paths
// ---------------------------------------------------------------------------

pub const SPEECH_CHAT: &str = "/speech/speech_chat";
pub const AVAILABLE_LANGUAGES: &str = "/chatbot/available-languages";
pub const GET_HISTORY: &str = "/chatbot/get-history";
pub const CLEAR_HISTORY: &str = "/chatbot/clear-history";
pub const ASK: &str = "/chatbot/ask";
pub const START_NEW_CONVERSATION: &str = "/chatbot/start-new-conversation";
pub const PROCESS_URL: &str = "/document/process-url";
pub const PROCESS_VIDEO: &str = "/document/process-video";
pub const UPLOAD_PDF: &str = "/document/upload-pdf";
pub const UPLOAD_PPT: &str = "/document/upload-ppt";

// ---------------------------------------------------------------------------
// IngestPayload
// ---------------------------------------------------------------------------

/// One document-ingestion submission.
///
/// File variants are sent as multipart form data, text variants as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestPayload {
    Pdf { file_name: String, bytes: Vec<u8> },
    SlideDeck { file_name: String, bytes: Vec<u8> },
    Url(String),
    Video(String),
}

impl IngestPayload {
    pub fn endpoint(&self) -> &'static str {
        match self {
            IngestPayload::Pdf { .. } => UPLOAD_PDF,
            IngestPayload::SlideDeck { .. } => UPLOAD_PPT,
            IngestPayload::Url(_) => PROCESS_URL,
            IngestPayload::Video(_) => PROCESS_VIDEO,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Async interface to the document-chat backend, one method per endpoint.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// behind an `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn available_languages(&self) -> Result<LanguagesResponse, ApiError>;

    async fn history(&self) -> Result<HistoryResponse, ApiError>;

    async fn clear_history(&self) -> Result<MessageResponse, ApiError>;

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError>;

    async fn start_new_conversation(&self) -> Result<MessageResponse, ApiError>;

    /// One voice turn.  The backend records, transcribes and answers before
    /// this returns.
    async fn speech_chat(&self, request: &SpeechChatRequest)
        -> Result<SpeechChatResponse, ApiError>;

    async fn ingest(&self, payload: IngestPayload) -> Result<MessageResponse, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

/// Calls the backend over HTTP with `reqwest`.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build an `HttpBackend` from application config.
    ///
    /// A default client is used as a last-resort fallback if the builder
    /// fails.
    pub fn from_config(config: &BackendConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success status into [`ApiError::Backend`], reading the
    /// `{ "error": … }` body when there is one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Confirmation-only endpoints: a success status is enough, the body is
    /// read when it parses.
    async fn read_message(response: reqwest::Response) -> Result<MessageResponse, ApiError> {
        let response = Self::check(response).await?;
        let text = response.text().await?;
        match serde_json::from_str::<MessageResponse>(&text) {
            Ok(body) => Ok(body),
            Err(e) => {
                log::debug!("backend: confirmation body was not JSON ({e})");
                Ok(MessageResponse::default())
            }
        }
    }

    fn file_part(file_name: &str, bytes: Vec<u8>) -> reqwest::multipart::Part {
        reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn available_languages(&self) -> Result<LanguagesResponse, ApiError> {
        let response = self.client.get(self.url(AVAILABLE_LANGUAGES)).send().await?;
        Self::read_json(response).await
    }

    async fn history(&self) -> Result<HistoryResponse, ApiError> {
        let response = self.client.get(self.url(GET_HISTORY)).send().await?;
        Self::read_json(response).await
    }

    async fn clear_history(&self) -> Result<MessageResponse, ApiError> {
        let response = self.client.post(self.url(CLEAR_HISTORY)).send().await?;
        Self::read_message(response).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        let response = self.client.post(self.url(ASK)).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn start_new_conversation(&self) -> Result<MessageResponse, ApiError> {
        let response = self
            .client
            .post(self.url(START_NEW_CONVERSATION))
            .send()
            .await?;
        Self::read_message(response).await
    }

    async fn speech_chat(
        &self,
        request: &SpeechChatRequest,
    ) -> Result<SpeechChatResponse, ApiError> {
        let response = self
            .client
            .post(self.url(SPEECH_CHAT))
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn ingest(&self, payload: IngestPayload) -> Result<MessageResponse, ApiError> {
        let url = self.url(payload.endpoint());
        let request = match payload {
            IngestPayload::Pdf { file_name, bytes } => {
                let form = reqwest::multipart::Form::new()
                    .part("pdf", Self::file_part(&file_name, bytes));
                self.client.post(url).multipart(form)
            }
            IngestPayload::SlideDeck { file_name, bytes } => {
                let form = reqwest::multipart::Form::new()
                    .part("powerPoint", Self::file_part(&file_name, bytes));
                self.client.post(url).multipart(form)
            }
            IngestPayload::Url(url_value) => self
                .client
                .post(url)
                .json(&ProcessUrlRequest { url: url_value }),
            IngestPayload::Video(video_url) => self
                .client
                .post(url)
                .json(&ProcessVideoRequest { video_url }),
        };

        let response = request.send().await?;
        Self::read_message(response).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
