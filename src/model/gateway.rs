//! Backend-neutral chat request and reply models

use serde::Serialize;

/// Media type assumed for raw base64 image payloads
pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// Chat message role
///
/// Only user turns are sent by the current prompts.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One segment of a multimodal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Data URI or raw base64 payload
    Image(String),
}

/// Message content: plain text or an ordered list of segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn has_image(&self) -> bool {
        match self {
            MessageContent::Text(_) => false,
            MessageContent::Parts(parts) => {
                parts.iter().any(|p| matches!(p, ContentPart::Image(_)))
            }
        }
    }

    /// Total length of the text segments
    pub fn text_len(&self) -> usize {
        match self {
            MessageContent::Text(text) => text.len(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text(text) => text.len(),
                    ContentPart::Image(_) => 0,
                })
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Structured-output hint sent with a request
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    /// Schema hint derived from a `JsonSchema` type
    pub fn of<T: schemars::JsonSchema>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema_value::<T>(),
        }
    }
}

/// JSON schema of `T` as a plain JSON value
pub fn schema_value<T: schemars::JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(serde_json::Value::Null)
}

/// One chat-completion request; sent once and discarded
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model_id: String,
    pub messages: Vec<ChatMessage>,
    pub response_schema: Option<ResponseSchema>,
    pub temperature: Option<f32>,
}

impl ModelRequest {
    pub fn new(model_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            response_schema: None,
            temperature: None,
        }
    }

    pub fn with_response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn has_image(&self) -> bool {
        self.messages.iter().any(|m| m.content.has_image())
    }

    pub fn prompt_len(&self) -> usize {
        self.messages.iter().map(|m| m.content.text_len()).sum()
    }
}

/// Raw reply from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub raw_text: String,
    pub model_id_echo: String,
}

/// Normalize an image payload into a data URI
///
/// Payloads already carrying a `data:` scheme are returned unchanged.
pub fn image_data_uri(payload: &str) -> String {
    if payload.starts_with("data:") {
        payload.to_string()
    } else {
        format!("data:{};base64,{}", DEFAULT_IMAGE_MEDIA_TYPE, payload)
    }
}
