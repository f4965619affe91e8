//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use audit_backend::domain::AppMode;
use audit_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) mode: AppMode,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) evidence_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Construct a server configuration from session and listener settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            mode: AppMode::Live,
            db_pool: None,
            evidence_dir: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: AppMode) -> Self {
        self.mode = mode;
        self
    }

    /// Attach a database connection pool for the audit repositories.
    ///
    /// Without a pool the server answers from fixture ports.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Directory uploaded evidence is written under.
    #[must_use]
    pub fn with_evidence_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.evidence_dir = Some(path.into());
        self
    }
}
