//! Health check endpoints

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

const SERVICE_RUNNING: &str = "Screen Shock API is running";

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ApiRootStatus {
    pub message: String,
}

/// Liveness check endpoint
///
/// Always returns 200 OK if the service is running. The service is stateless,
/// so there are no dependencies to check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "healthy".to_string(),
        message: SERVICE_RUNNING.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// API root
#[utoipa::path(
    get,
    path = "/api/",
    responses(
        (status = 200, description = "API is reachable", body = ApiRootStatus)
    ),
    tag = "health"
)]
#[get("/api/")]
pub async fn api_root() -> impl Responder {
    HttpResponse::Ok().json(ApiRootStatus {
        message: SERVICE_RUNNING.to_string(),
    })
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(api_root);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_health_endpoints() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let req = test::TestRequest::get().uri("/api/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
