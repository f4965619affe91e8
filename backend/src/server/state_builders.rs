//! Builders wiring persistence adapters into the HTTP state.

use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use audit_backend::domain::ports::{
    AuditSessionCommand, AuditSessionQuery, EvidenceFileStore, FixtureEvidenceFileStore,
};
use audit_backend::domain::{AuditServicePorts, AuditSessionService};
use audit_backend::inbound::http::state::{HttpState, HttpStatePorts};
use audit_backend::outbound::evidence::open_evidence_store;
use audit_backend::outbound::insight::CannedInsightSource;
use audit_backend::outbound::persistence::{
    DbPool, DieselAuditResponseRepository, DieselAuditSessionRepository, DieselControlRepository,
};

use super::ServerConfig;

/// Evidence store over `evidence_dir`, or a discarding fixture when none is
/// configured.
fn build_evidence_store(
    evidence_dir: Option<&Path>,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn EvidenceFileStore>> {
    match evidence_dir {
        Some(path) => {
            let store = open_evidence_store(path, clock).map_err(std::io::Error::other)?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(FixtureEvidenceFileStore)),
    }
}

fn build_audit_ports(
    pool: &DbPool,
    evidence: Arc<dyn EvidenceFileStore>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts {
    let service = Arc::new(AuditSessionService::new(
        AuditServicePorts {
            sessions: Arc::new(DieselAuditSessionRepository::new(pool.clone())),
            responses: Arc::new(DieselAuditResponseRepository::new(pool.clone())),
            controls: Arc::new(DieselControlRepository::new(pool.clone())),
            evidence,
            insights: Arc::new(CannedInsightSource),
        },
        clock,
    ));
    HttpStatePorts {
        audit_commands: Arc::clone(&service) as Arc<dyn AuditSessionCommand>,
        audit_queries: service as Arc<dyn AuditSessionQuery>,
    }
}

/// Build HTTP state from the configured pool, falling back to fixture ports
/// when no pool is configured.
///
/// # Errors
///
/// Returns an I/O error when the evidence directory cannot be opened.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = match &config.db_pool {
        Some(pool) => {
            let evidence = build_evidence_store(config.evidence_dir.as_deref(), Arc::clone(&clock))?;
            build_audit_ports(pool, evidence, clock)
        }
        None => HttpStatePorts::default(),
    };
    Ok(web::Data::new(HttpState::new(ports, config.mode)))
}
