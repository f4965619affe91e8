//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::AppMode;
use crate::domain::ports::{
    AuditSessionCommand, AuditSessionQuery, FixtureAuditSessionCommand, FixtureAuditSessionQuery,
};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub audit_commands: Arc<dyn AuditSessionCommand>,
    pub audit_queries: Arc<dyn AuditSessionQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            audit_commands: Arc::new(FixtureAuditSessionCommand),
            audit_queries: Arc::new(FixtureAuditSessionQuery),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub audit_commands: Arc<dyn AuditSessionCommand>,
    pub audit_queries: Arc<dyn AuditSessionQuery>,
    pub mode: AppMode,
}

impl HttpState {
    /// Construct state from the port bundle and the configured mode.
    pub fn new(ports: HttpStatePorts, mode: AppMode) -> Self {
        let HttpStatePorts {
            audit_commands,
            audit_queries,
        } = ports;
        Self {
            audit_commands,
            audit_queries,
            mode,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, AppMode::Live)
    }
}
