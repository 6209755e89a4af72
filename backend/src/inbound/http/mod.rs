//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod clients;
pub mod delivery_notes;
pub mod error;
pub mod health;
pub mod projects;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

use self::error::{json_config, multipart_config, path_config};

/// Mount every resource under `/api` with the shared extractor configuration.
///
/// Handlers read [`state::HttpState`] from app data; callers register it.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(path_config())
            .app_data(multipart_config())
            .service(web::scope("/users").configure(users::configure))
            .service(web::scope("/clients").configure(clients::configure))
            .service(web::scope("/projects").configure(projects::configure))
            .service(web::scope("/deliverynote").configure(delivery_notes::configure)),
    );
}
