//! Backend entry-point: loads settings, prepares the database and serves the
//! audit questionnaire.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use audit_backend::inbound::http::health::{HealthState, StartupStage};
use audit_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use audit_backend::outbound::persistence::{
    DbPool, DieselControlRepository, PoolConfig, run_migrations,
};
use audit_backend::settings::AuditSettings;

use server::{ServerConfig, create_server, seeding::seed_controls};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AuditSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let mode = settings.mode();

    let health_state = web::Data::new(HealthState::new());
    let database_url = settings.database_url().to_owned();
    let applied = web::block(move || run_migrations(&database_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, database = settings.database_url(), "database migrated");
    health_state.advance(StartupStage::Seeding);

    let pool_config = PoolConfig::new(settings.database_url())
        .with_max_size(settings.pool_max_size().map_err(std::io::Error::other)?);
    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;

    if let Some(seed) = settings.controls_seed() {
        let controls = DieselControlRepository::new(pool.clone());
        seed_controls(&controls, seed)
            .await
            .map_err(std::io::Error::other)?;
    }

    let config = ServerConfig::new(session.key, session.cookie_secure, session.same_site, bind_addr)
        .with_mode(mode)
        .with_db_pool(pool)
        .with_evidence_dir(settings.evidence_dir());

    info!(%bind_addr, %mode, "starting audit service");
    create_server(health_state, config)?.await
}
