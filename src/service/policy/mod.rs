//! Focus policy generation service
//!
//! Turns a free-text goal into an allow/block `Policy` using a text model.

use std::sync::Arc;

use crate::model::gateway::schema_value;
use crate::model::{ChatMessage, ExtractedPolicy, ModelRequest, Policy, ResponseSchema};
use crate::service::llm::ModelGateway;
use crate::service::policy::prompts::build_policy_prompt;

pub mod error;
pub mod prompts;

pub use error::GenerationError;

/// Name of the structured-output schema sent with generation requests
const POLICY_SCHEMA_NAME: &str = "focus_policy";

/// Service for generating focus policies
pub struct PolicyGenerator {
    gateway: Arc<dyn ModelGateway>,
    model: String,
    temperature: f32,
}

impl PolicyGenerator {
    /// Create a generator with its default model and temperature
    pub fn new(gateway: Arc<dyn ModelGateway>, model: String, temperature: f32) -> Self {
        tracing::info!(
            model = %model,
            temperature = temperature,
            "Policy generator initialized"
        );

        Self {
            gateway,
            model,
            temperature,
        }
    }

    /// Generate a policy with the configured model and temperature
    pub async fn generate_default(&self, goal_text: &str) -> Result<Policy, GenerationError> {
        self.generate(goal_text, &self.model, self.temperature).await
    }

    /// Generate a policy for `goal_text`
    ///
    /// Requests structured output but repairs the reply regardless: bare-string
    /// entries become `{website, intent: "all"}`. No retries.
    pub async fn generate(
        &self,
        goal_text: &str,
        model_id: &str,
        temperature: f32,
    ) -> Result<Policy, GenerationError> {
        let schema = schema_value::<Policy>().to_string();
        let prompt = build_policy_prompt(goal_text, &schema);
        let prompt_length = prompt.len();

        let request = ModelRequest::new(model_id, vec![ChatMessage::user_text(prompt)])
            .with_response_schema(ResponseSchema::of::<Policy>(POLICY_SCHEMA_NAME))
            .with_temperature(temperature);

        tracing::debug!(
            model = %model_id,
            prompt_length = prompt_length,
            "Initiating model call for policy generation"
        );

        let start_time = std::time::Instant::now();

        let reply = match self.gateway.complete(request).await {
            Ok(reply) => {
                tracing::info!(
                    model = %reply.model_id_echo,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    "Model call for policy generation completed"
                );
                reply
            }
            Err(e) => {
                tracing::error!(
                    model = %model_id,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "Model call for policy generation failed"
                );
                return Err(GenerationError::Backend(e.to_string()));
            }
        };

        parse_policy_reply(&reply.raw_text)
    }
}

/// Parse and repair a generation reply
///
/// The reply must be a bare JSON document; fenced or partial replies are
/// rejected rather than guessed at.
pub fn parse_policy_reply(raw_text: &str) -> Result<Policy, GenerationError> {
    let extracted: ExtractedPolicy = serde_json::from_str(raw_text).map_err(|e| {
        tracing::error!(
            error = %e,
            raw_length = raw_text.len(),
            "Policy reply does not match the expected shape"
        );
        GenerationError::MalformedReply(e.to_string())
    })?;

    let repaired = extracted.bare_entries();
    if repaired > 0 {
        tracing::debug!(repaired = repaired, "Rewrote bare-string policy entries");
    }

    let policy = extracted.repair();

    tracing::debug!(
        allowlist_count = policy.allowlist.len(),
        blocklist_count = policy.blocklist.len(),
        "Parsed policy reply"
    );

    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MessageContent, SiteRule};
    use crate::service::llm::testing::ScriptedGateway;

    const GOAL: &str = "I want to program for two hours";

    fn generator(gateway: Arc<ScriptedGateway>) -> PolicyGenerator {
        PolicyGenerator::new(gateway, "google/gemini-2.5-flash".into(), 0.2)
    }

    #[tokio::test]
    async fn test_generate_repairs_bare_entries() {
        let gateway = ScriptedGateway::replying(
            r#"{"allowlist":["github.com"],"blocklist":[{"website":"youtube.com","intent":"non-programming videos"}]}"#,
        );
        let policy = generator(gateway.clone()).generate_default(GOAL).await.unwrap();

        assert_eq!(
            policy,
            Policy {
                allowlist: vec![SiteRule::new("github.com", "all")],
                blocklist: vec![SiteRule::new("youtube.com", "non-programming videos")],
            }
        );
    }

    #[tokio::test]
    async fn test_request_carries_schema_temperature_and_goal() {
        let gateway = ScriptedGateway::replying(r#"{"allowlist":[],"blocklist":[]}"#);
        let policy = generator(gateway.clone())
            .generate(GOAL, "openai/gpt-4o", 0.7)
            .await
            .unwrap();
        assert_eq!(policy, Policy::default());

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model_id, "openai/gpt-4o");
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(
            request.response_schema.as_ref().map(|s| s.name.as_str()),
            Some(POLICY_SCHEMA_NAME)
        );
        assert_eq!(request.messages.len(), 1);
        match &request.messages[0].content {
            MessageContent::Text(prompt) => {
                assert!(prompt.contains(GOAL));
                assert!(prompt.contains("allowlist"));
            }
            other => panic!("expected text prompt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_reply_is_generation_failure() {
        let gateway = ScriptedGateway::replying("Here is your policy: allow github.com");
        let result = generator(gateway.clone()).generate_default(GOAL).await;
        assert!(matches!(result, Err(GenerationError::MalformedReply(_))));
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_not_accepted() {
        let gateway =
            ScriptedGateway::replying("```json\n{\"allowlist\":[],\"blocklist\":[]}\n```");
        let result = generator(gateway).generate_default(GOAL).await;
        assert!(matches!(result, Err(GenerationError::MalformedReply(_))));
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_message_without_retry() {
        let gateway = ScriptedGateway::failing("connection refused");
        let result = generator(gateway.clone()).generate_default(GOAL).await;

        match result {
            Err(GenerationError::Backend(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(gateway.requests().len(), 1);
    }

    #[test]
    fn test_parse_policy_reply_wrong_shape() {
        assert!(matches!(
            parse_policy_reply(r#"{"allowlist":{"github.com":"all"},"blocklist":[]}"#),
            Err(GenerationError::MalformedReply(_))
        ));
    }
}
