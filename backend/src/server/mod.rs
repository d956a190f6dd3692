//! HTTP server assembly.

pub mod config;

use actix_web::web;

use crate::inbound::http::{accounts, health, invitations, uploads, HttpState};

pub use config::{AppConfig, ConfigError, ObjectStoreConfig};

/// Register every route and the shared state on an actix app.
///
/// The API lives under `/api/v1`; the liveness probe sits outside the
/// versioned prefix.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: HttpState) {
    cfg.app_data(web::Data::new(state))
        .service(
            web::scope("/api/v1")
                .service(accounts::signup)
                .service(accounts::login)
                .service(uploads::presign)
                .service(uploads::upload)
                .service(invitations::list)
                .service(invitations::create)
                .service(invitations::update)
                .service(invitations::remove)
                .service(invitations::get_public),
        )
        .service(health::ping);
}
