use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_common::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged turn of a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Chat-completion payload as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// Some gateways report failures inside a 200 body.
    #[serde(default)]
    pub error_msg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Kept loose: a gateway sending a non-string body must not fail the
    /// decode, the extractor falls back on it instead.
    #[serde(default)]
    pub content: Option<Value>,
}

impl ChoiceMessage {
    /// The message body when it is a string, empty text otherwise.
    pub fn text(&self) -> &str {
        self.content.as_ref().and_then(Value::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl ChatCompletion {
    /// Text of the first choice; a null or non-string message body reads as
    /// empty text. `None` only when the reply carries no choices at all.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.text())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one chat request and return the provider's reply.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
