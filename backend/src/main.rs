//! Albaran entry-point: loads settings, prepares the database and serves
//! the REST API.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use albaran::inbound::http::health::HealthState;
use albaran::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{AppSettings, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| io::Error::other(format!("configuration: {err}")))?;

    if settings.run_migrations() {
        run_migrations(&settings.database_url)
            .await
            .map_err(|err| io::Error::other(format!("migrations: {err}")))?;
    }

    let pool = DbPool::new(
        PoolConfig::new(settings.database_url.as_str()).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(|err| io::Error::other(err.to_string()))?;

    let http_state = build_http_state(&settings, &pool)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, &settings)?;
    info!(addr = %settings.bind_addr(), "albaran listening");
    server.await
}
