use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://supportify-bob-ai.onrender.com/generate";

/// Body of the single POST the chat endpoint accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub conversation_id: String,
}

/// Successful reply body. Only `answer` and `response` are looked at; either
/// may be missing or hold something other than text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub answer: Option<Value>,
    pub response: Option<Value>,
}

impl ChatReply {
    /// Pick the text fields out of a decoded body. Anything that isn't a JSON
    /// object (array, string, number, null) carries no fields at all.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut fields) => Self {
                answer: fields.remove("answer"),
                response: fields.remove("response"),
            },
            _ => Self::default(),
        }
    }

    pub fn answer(text: &str) -> Self {
        Self {
            answer: Some(Value::String(text.to_string())),
            response: None,
        }
    }

    /// The reply text: `answer` first, then `response`. Empty strings and
    /// non-string values don't count.
    pub fn text(&self) -> Option<&str> {
        [&self.answer, &self.response]
            .into_iter()
            .filter_map(|field| field.as_ref().and_then(Value::as_str))
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to chat endpoint failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("chat endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("could not decode chat endpoint reply: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything that can answer one chat question
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        log::debug!(
            "POST {} (conversation {})",
            self.endpoint,
            request.conversation_id
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(ChatError::Request)?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }

        let body: Value = response.json().await.map_err(ChatError::Decode)?;
        Ok(ChatReply::from_body(body))
    }
}
