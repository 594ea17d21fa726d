//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{error, focus, health};
use crate::model::{ComplianceVerdict, Policy, SiteRule, StimulusReceipt};

#[derive(OpenApi)]
#[openapi(
    info(title = "Screen Shock API"),
    paths(
        health::health,
        health::api_root,
        focus::generate_config,
        focus::evaluate_capture,
        focus::deliver_stimulus,
    ),
    components(schemas(
        Policy,
        SiteRule,
        ComplianceVerdict,
        StimulusReceipt,
        focus::GenerateConfigRequest,
        focus::EvaluateCaptureRequest,
        focus::DeliverStimulusRequest,
        error::ErrorResponse,
        health::HealthStatus,
        health::ApiRootStatus,
    )),
    tags(
        (name = "focus", description = "Focus policy generation and screenshot evaluation"),
        (name = "stimulus", description = "Stimulus device delivery"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
