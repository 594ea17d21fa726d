pub mod error;
pub mod focus;
pub mod health;
pub mod openapi;

use actix_web::web;

/// Register every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(focus::configure)
        .configure(openapi::configure);
}
