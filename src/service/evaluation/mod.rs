//! Screenshot evaluation service
//!
//! Judges a screenshot against a focus policy using a vision model. Evaluation
//! is deliberately non-fatal: an unusable reply yields an empty verdict.

use std::sync::Arc;

use serde_json::Value;

use crate::model::gateway::schema_value;
use crate::model::{ChatMessage, ComplianceVerdict, ContentPart, EvaluationReply, ModelRequest, SiteRule};
use crate::service::evaluation::prompts::build_evaluation_prompt;
use crate::service::llm::ModelGateway;
use crate::service::reply::parse_lenient_json;

pub mod prompts;

/// Error type for screenshot evaluation
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EvaluationError {
    /// The model backend failed; carries the backend's message
    #[error("Model backend failure: {0}")]
    Backend(String),
}

/// Service for evaluating screenshots against a policy
pub struct CaptureEvaluator {
    gateway: Arc<dyn ModelGateway>,
    model: String,
}

impl CaptureEvaluator {
    pub fn new(gateway: Arc<dyn ModelGateway>, model: String) -> Self {
        tracing::info!(model = %model, "Capture evaluator initialized");
        Self { gateway, model }
    }

    /// Evaluate with the configured vision model
    pub async fn evaluate_default(
        &self,
        image: &str,
        allowlist: &[SiteRule],
        blocklist: &[SiteRule],
    ) -> Result<ComplianceVerdict, EvaluationError> {
        self.evaluate(image, allowlist, blocklist, &self.model).await
    }

    /// Evaluate a screenshot (raw base64 or data URI) against both lists
    ///
    /// No structured-output hint is sent on this path. Only a failed backend
    /// call is an error; any reply that arrives becomes a verdict.
    pub async fn evaluate(
        &self,
        image: &str,
        allowlist: &[SiteRule],
        blocklist: &[SiteRule],
        model_id: &str,
    ) -> Result<ComplianceVerdict, EvaluationError> {
        let schema = schema_value::<EvaluationReply>().to_string();
        let prompt = build_evaluation_prompt(allowlist, blocklist, &schema);
        let prompt_length = prompt.len();

        let request = ModelRequest::new(
            model_id,
            vec![ChatMessage::user_parts(vec![
                ContentPart::Text(prompt),
                ContentPart::Image(image.to_string()),
            ])],
        );

        tracing::debug!(
            model = %model_id,
            prompt_length = prompt_length,
            image_length = image.len(),
            allowlist_count = allowlist.len(),
            blocklist_count = blocklist.len(),
            "Initiating model call for capture evaluation"
        );

        let start_time = std::time::Instant::now();

        let reply = self.gateway.complete(request).await.map_err(|e| {
            tracing::error!(
                model = %model_id,
                elapsed_ms = start_time.elapsed().as_millis(),
                error = %e,
                "Model call for capture evaluation failed"
            );
            EvaluationError::Backend(e.to_string())
        })?;

        tracing::info!(
            model = %reply.model_id_echo,
            elapsed_ms = start_time.elapsed().as_millis(),
            prompt_length = prompt_length,
            "Model call for capture evaluation completed"
        );

        let verdict = verdict_from_reply(&reply.raw_text);

        if verdict.is_empty() {
            tracing::warn!(model = %reply.model_id_echo, "Capture evaluation produced no labels");
        } else {
            tracing::debug!(
                labels = verdict.len(),
                violations = verdict.violations().count(),
                "Capture evaluation verdict"
            );
        }

        Ok(verdict)
    }
}

/// Extract a verdict from a raw vision reply
///
/// Unparsable text, a missing `result` or a non-object `result` all yield an
/// empty verdict. Labels are passed through without checking them against
/// the submitted lists.
pub fn verdict_from_reply(raw_text: &str) -> ComplianceVerdict {
    let Some(parsed) = parse_lenient_json(raw_text) else {
        tracing::warn!(raw = %raw_text, "Evaluation reply is not valid JSON, returning empty verdict");
        return ComplianceVerdict::empty();
    };

    let Some(result) = parsed.get("result") else {
        tracing::debug!("Evaluation reply has no result field");
        return ComplianceVerdict::empty();
    };

    let Value::Object(entries) = result else {
        tracing::warn!(result = %result, "Evaluation result is not an object, returning empty verdict");
        return ComplianceVerdict::empty();
    };

    entries
        .iter()
        .filter_map(|(label, value)| match value {
            Value::Bool(allowed) => Some((label.clone(), *allowed)),
            other => {
                tracing::warn!(label = %label, value = %other, "Dropping non-boolean verdict entry");
                None
            }
        })
        .collect()
}
