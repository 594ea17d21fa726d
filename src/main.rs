use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(&config).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize services");
        std::io::Error::other(e.to_string())
    })?;

    let policy_generator = web::Data::from(state.policy_generator);
    let capture_evaluator = web::Data::from(state.capture_evaluator);
    let stimulus_client = web::Data::from(state.stimulus_client);

    tracing::info!("Starting Screen Shock server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(policy_generator.clone())
            .app_data(capture_evaluator.clone())
            .app_data(stimulus_client.clone())
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
