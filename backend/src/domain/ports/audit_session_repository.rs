//! Port for audit session persistence.

use async_trait::async_trait;

use crate::domain::audit::{AuditSession, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit session repository adapters.
    pub enum AuditSessionRepositoryError {
        /// Repository connection could not be established.
        Connection => "audit session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "audit session repository query failed: {message}",
    }
}

/// Port for writing and reading audit sessions. Sessions are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSessionRepository: Send + Sync {
    /// Persist a new session.
    async fn insert(&self, session: &AuditSession) -> Result<(), AuditSessionRepositoryError>;

    /// Persist `session` unless its token is already stored. Returns whether
    /// a row was written.
    async fn insert_if_absent(
        &self,
        session: &AuditSession,
    ) -> Result<bool, AuditSessionRepositoryError>;

    /// Find a session by token.
    async fn find(
        &self,
        token: &SessionToken,
    ) -> Result<Option<AuditSession>, AuditSessionRepositoryError>;

    /// All sessions, newest first.
    async fn list_recent(&self) -> Result<Vec<AuditSession>, AuditSessionRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditSessionRepository;

#[async_trait]
impl AuditSessionRepository for FixtureAuditSessionRepository {
    async fn insert(&self, _session: &AuditSession) -> Result<(), AuditSessionRepositoryError> {
        Ok(())
    }

    async fn insert_if_absent(
        &self,
        _session: &AuditSession,
    ) -> Result<bool, AuditSessionRepositoryError> {
        Ok(true)
    }

    async fn find(
        &self,
        _token: &SessionToken,
    ) -> Result<Option<AuditSession>, AuditSessionRepositoryError> {
        Ok(None)
    }

    async fn list_recent(&self) -> Result<Vec<AuditSession>, AuditSessionRepositoryError> {
        Ok(Vec::new())
    }
}
