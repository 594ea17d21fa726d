//! REST API endpoints for focus policies, capture evaluation and stimulus delivery

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::model::{ComplianceVerdict, Policy, SiteRule, StimulusReceipt};
use crate::service::{CaptureEvaluator, PolicyGenerator, StimulusClient};

/// Request body for policy generation
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateConfigRequest {
    /// Free-text focus goal, e.g. "I want to program for two hours"
    pub description: String,
}

/// Request body for screenshot evaluation
#[derive(Debug, Deserialize, ToSchema)]
pub struct EvaluateCaptureRequest {
    /// Screenshot as a data URI or raw base64 (JPEG assumed)
    pub screenshot: String,
    pub allowlist: Vec<SiteRule>,
    pub blocklist: Vec<SiteRule>,
}

/// Request body for stimulus delivery
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliverStimulusRequest {
    pub pavlok_token: String,
}

/// Generate allowlist and blocklist from a focus goal
#[utoipa::path(
    post,
    path = "/api/generate-config",
    request_body = GenerateConfigRequest,
    responses(
        (status = 200, description = "Policy generated", body = Policy),
        (status = 400, description = "Empty description", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Model reply could not be parsed", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Model backend failure", body = crate::api::error::ErrorResponse)
    ),
    tag = "focus"
)]
#[post("/api/generate-config")]
pub async fn generate_config(
    generator: web::Data<PolicyGenerator>,
    payload: web::Json<GenerateConfigRequest>,
) -> Result<HttpResponse, ApiError> {
    let description = payload.description.trim();
    if description.is_empty() {
        return Err(ApiError::BadRequest("description must not be empty".to_string()));
    }

    let policy = generator.generate_default(description).await?;

    tracing::info!(
        allowlist_count = policy.allowlist.len(),
        blocklist_count = policy.blocklist.len(),
        "Generated focus policy"
    );

    Ok(HttpResponse::Ok().json(policy))
}

/// Evaluate a screenshot against an allowlist and blocklist
#[utoipa::path(
    post,
    path = "/api/evaluate-capture-for-trigger",
    request_body = EvaluateCaptureRequest,
    responses(
        (status = 200, description = "Verdict per identified website or activity", body = ComplianceVerdict),
        (status = 400, description = "Empty screenshot", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Model backend failure", body = crate::api::error::ErrorResponse)
    ),
    tag = "focus"
)]
#[post("/api/evaluate-capture-for-trigger")]
pub async fn evaluate_capture(
    evaluator: web::Data<CaptureEvaluator>,
    payload: web::Json<EvaluateCaptureRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    if payload.screenshot.trim().is_empty() {
        return Err(ApiError::BadRequest("screenshot must not be empty".to_string()));
    }

    let verdict = evaluator
        .evaluate_default(&payload.screenshot, &payload.allowlist, &payload.blocklist)
        .await?;

    Ok(HttpResponse::Ok().json(verdict))
}

/// Deliver the configured stimulus through the Pavlok API
#[utoipa::path(
    post,
    path = "/api/deliver-stimulus",
    request_body = DeliverStimulusRequest,
    responses(
        (status = 200, description = "Stimulus delivered", body = StimulusReceipt),
        (status = 400, description = "Invalid token", body = crate::api::error::ErrorResponse),
        (status = 502, description = "Device API rejected the request", body = crate::api::error::ErrorResponse),
        (status = 504, description = "Device API timed out", body = crate::api::error::ErrorResponse)
    ),
    tag = "stimulus"
)]
#[post("/api/deliver-stimulus")]
pub async fn deliver_stimulus(
    client: web::Data<StimulusClient>,
    payload: web::Json<DeliverStimulusRequest>,
) -> Result<HttpResponse, ApiError> {
    let receipt = client.deliver(&payload.pavlok_token).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

/// Configure focus routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(generate_config)
        .service(evaluate_capture)
        .service(deliver_stimulus);
}
