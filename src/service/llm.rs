//! Shared model gateway
//!
//! Single call point for chat-completion backends, used by both the policy
//! generator and the capture evaluator.

use async_trait::async_trait;
use rig::OneOrMany;
use rig::client::CompletionClient;
use rig::completion::{AssistantContent, CompletionModel, Message};
use rig::message::UserContent;
use rig::providers::openai;

use crate::model::gateway::image_data_uri;
use crate::model::{ChatMessage, ContentPart, MessageContent, ModelReply, ModelRequest, Role};
use crate::service::error_chain;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ModelGatewayError {
    /// Transport, authentication or backend-side failure, message verbatim
    #[error("{0}")]
    Backend(String),

    #[error("Invalid model request: {0}")]
    InvalidRequest(String),
}

/// Sends one chat-style request and returns the raw reply text
///
/// Structured-output hints are forwarded to the backend but never enforced;
/// callers validate the reply shape themselves.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply, ModelGatewayError>;
}

/// Gateway for OpenAI-compatible `/chat/completions` endpoints (OpenRouter, OpenAI)
///
/// Uses rig's OpenAI provider on the Chat Completions API, so any endpoint
/// speaking that protocol works through `base_url`.
#[derive(Clone)]
pub struct OpenAiCompatibleGateway {
    client: openai::CompletionsClient,
}

impl OpenAiCompatibleGateway {
    /// Create a gateway for the given endpoint and bearer credential
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, String> {
        let client = openai::Client::builder()
            .api_key(api_key)
            .base_url(base_url.trim_end_matches('/'))
            .build()
            .map_err(|e| format!("Failed to create OpenAI client: {}", e))?
            .completions_api();

        Ok(Self { client })
    }

    fn validate(request: &ModelRequest) -> Result<(), ModelGatewayError> {
        if request.model_id.trim().is_empty() {
            return Err(ModelGatewayError::InvalidRequest(
                "model identifier is empty".to_string(),
            ));
        }
        if request.messages.is_empty() {
            return Err(ModelGatewayError::InvalidRequest(
                "request has no messages".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a request into rig's preamble, history and final prompt
///
/// System turns become the preamble; the last user or assistant turn is the
/// prompt and everything before it is history.
fn to_rig_messages(
    messages: &[ChatMessage],
) -> Result<(Option<String>, Vec<Message>, Message), ModelGatewayError> {
    let mut preamble: Vec<String> = Vec::new();
    let mut turns: Vec<Message> = Vec::new();

    for message in messages {
        match message.role {
            Role::System => preamble.push(text_of(&message.content)),
            Role::User => turns.push(Message::User {
                content: user_content(&message.content)?,
            }),
            Role::Assistant => turns.push(Message::assistant(text_of(&message.content))),
        }
    }

    let prompt = turns.pop().ok_or_else(|| {
        ModelGatewayError::InvalidRequest("request has no user or assistant turn".to_string())
    })?;
    let preamble = (!preamble.is_empty()).then(|| preamble.join("\n\n"));

    Ok((preamble, turns, prompt))
}

fn text_of(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn user_content(content: &MessageContent) -> Result<OneOrMany<UserContent>, ModelGatewayError> {
    let parts = match content {
        MessageContent::Text(text) => vec![UserContent::text(text.clone())],
        MessageContent::Parts(parts) => parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(text) => UserContent::text(text.clone()),
                // Sent as an image URL; data URIs pass through unchanged
                ContentPart::Image(payload) => {
                    UserContent::image_url(image_data_uri(payload), None, None)
                }
            })
            .collect(),
    };

    OneOrMany::many(parts)
        .map_err(|_| ModelGatewayError::InvalidRequest("message has no content".to_string()))
}

/// Extra body fields for the Chat Completions call
fn response_format_params(request: &ModelRequest) -> Option<serde_json::Value> {
    request.response_schema.as_ref().map(|s| {
        serde_json::json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": s.name,
                    "schema": s.schema,
                    "strict": false
                }
            }
        })
    })
}

#[async_trait]
impl ModelGateway for OpenAiCompatibleGateway {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply, ModelGatewayError> {
        Self::validate(&request)?;

        tracing::debug!(
            model = %request.model_id,
            prompt_length = request.prompt_len(),
            multimodal = request.has_image(),
            structured = request.response_schema.is_some(),
            "Sending chat completion request"
        );

        let (preamble, history, prompt) = to_rig_messages(&request.messages)?;
        let model = self.client.completion_model(&request.model_id);

        let mut builder = model.completion_request(prompt).messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(params) = response_format_params(&request) {
            builder = builder.additional_params(params);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ModelGatewayError::Backend(error_chain(&e)))?;

        let raw_text = response
            .choice
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if raw_text.is_empty() {
            return Err(ModelGatewayError::Backend(
                "Backend returned no message content".to_string(),
            ));
        }

        let model_id_echo = if response.raw_response.model.is_empty() {
            request.model_id
        } else {
            response.raw_response.model
        };

        Ok(ModelReply {
            raw_text,
            model_id_echo,
        })
    }
}
