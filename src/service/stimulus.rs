//! Pavlok stimulus API client
//!
//! Delivers a fixed stimulus to the user's device when a capture is judged
//! off task.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::model::config::StimulusConfig;
use crate::model::{StimulusKind, StimulusReceipt, StimulusSettings};
use crate::service::error_chain;

/// Tokens shorter than this are rejected without calling the device API
const MIN_TOKEN_LENGTH: usize = 10;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StimulusError {
    #[error("Invalid Pavlok token")]
    InvalidToken,

    #[error("Timeout connecting to Pavlok API")]
    Timeout,

    #[error("Pavlok API error: {status} - {detail}")]
    Rejected { status: u16, detail: String },

    #[error("HTTP request failed: {}", error_chain(.0))]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Serialize)]
struct StimulusBody {
    stimulus: StimulusPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StimulusPayload {
    stimulus_type: StimulusKind,
    stimulus_value: u8,
}

/// Client for the Pavlok stimulus API
pub struct StimulusClient {
    client: Client,
    base_url: String,
    settings: StimulusSettings,
}

impl StimulusClient {
    /// Create a client with a bounded request timeout
    pub fn new(config: &StimulusConfig) -> Result<Self, StimulusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StimulusError::Client(error_chain(&e)))?;

        tracing::info!(
            kind = ?config.settings.kind,
            value = config.settings.value,
            timeout_secs = config.timeout_secs,
            "Stimulus client initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            settings: config.settings,
        })
    }

    /// Send the configured stimulus to the device owning `token`
    ///
    /// One attempt only; a timeout maps to `StimulusError::Timeout`.
    pub async fn deliver(&self, token: &str) -> Result<StimulusReceipt, StimulusError> {
        if token.len() < MIN_TOKEN_LENGTH {
            return Err(StimulusError::InvalidToken);
        }

        let url = format!("{}/stimulus/send", self.base_url);
        let body = StimulusBody {
            stimulus: StimulusPayload {
                stimulus_type: self.settings.kind,
                stimulus_value: self.settings.value,
            },
        };

        tracing::debug!(url = %url, kind = ?self.settings.kind, "Sending stimulus");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StimulusError::Timeout
                } else {
                    StimulusError::HttpError(e)
                }
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let detail = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %error_chain(&e), "Failed to read device API error body");
                    status.canonical_reason().unwrap_or_default().to_string()
                }
            };
            tracing::warn!(status = status.as_u16(), detail = %detail, "Stimulus rejected by device API");
            return Err(StimulusError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::info!(kind = ?self.settings.kind, "Stimulus delivered");

        Ok(StimulusReceipt {
            success: true,
            message: "Stimulus delivered successfully".to_string(),
        })
    }
}


#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use serde_json::{Value, json};

    use super::testing::spawn_stalled_device_api;
    use super::*;

    const TOKEN: &str = "pavlok-token-123";

    async fn send_stimulus(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
        let authorized = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer pavlok-token-123");
        if !authorized {
            return HttpResponse::Unauthorized().json(json!({"message": "Unauthorized"}));
        }
        if body.0 != json!({"stimulus": {"stimulusType": "zap", "stimulusValue": 50}}) {
            return HttpResponse::UnprocessableEntity().body(body.0.to_string());
        }
        HttpResponse::Ok().json(json!({"success": true}))
    }

    fn spawn_device_api() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = HttpServer::new(|| {
            App::new().route("/api/v5/stimulus/send", web::post().to(send_stimulus))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        tokio::spawn(server);
        format!("http://127.0.0.1:{}/api/v5", port)
    }

    fn client_with_timeout(base_url: String, timeout_secs: u64) -> StimulusClient {
        StimulusClient::new(&StimulusConfig {
            base_url,
            settings: StimulusSettings::new(StimulusKind::Zap, 50),
            timeout_secs,
        })
        .unwrap()
    }

    fn client(base_url: String) -> StimulusClient {
        client_with_timeout(base_url, 10)
    }

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn test_short_token_rejected_locally() {
        let result = client("http://127.0.0.1:1".into()).deliver("short").await;
        assert!(matches!(result, Err(StimulusError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_delivery_success() {
        let receipt = client(spawn_device_api()).deliver(TOKEN).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.message, "Stimulus delivered successfully");
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_detail() {
        let result = client(spawn_device_api()).deliver("someone-elses-token").await;
        match result {
            Err(StimulusError::Rejected { status, detail }) => {
                assert_eq!(status, 401);
                assert!(detail.contains("Unauthorized"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_device_api_times_out() {
        let client = client_with_timeout(spawn_stalled_device_api(), 1);
        let started = std::time::Instant::now();
        let result = client.deliver(TOKEN).await;

        assert!(matches!(result, Err(StimulusError::Timeout)), "got {:?}", result);
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_unreachable_device_api_reports_cause() {
        let result = client(closed_port_url()).deliver(TOKEN).await;
        match result {
            Err(err @ StimulusError::HttpError(_)) => {
                let msg = err.to_string().to_lowercase();
                assert!(msg.contains("connection refused"), "cause missing from: {msg}");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
