//! Port for scored responses and their evidence rows.

use async_trait::async_trait;

use crate::domain::audit::{
    AnsweredControl, ControlId, EvidenceFile, ResponseId, ResponseUpsert, SessionToken,
    StoredResponse,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit response repository adapters.
    pub enum AuditResponseRepositoryError {
        /// Repository connection could not be established.
        Connection => "audit response repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "audit response repository query failed: {message}",
    }
}

/// Port for the per-(session, control) response rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditResponseRepository: Send + Sync {
    /// The response of `session` to `control_id`, with its URLs and files.
    async fn find(
        &self,
        session: &SessionToken,
        control_id: ControlId,
    ) -> Result<Option<StoredResponse>, AuditResponseRepositoryError>;

    /// Insert or update the response keyed by session and control, replacing
    /// its URLs in the same transaction.
    async fn upsert(
        &self,
        upsert: &ResponseUpsert,
    ) -> Result<ResponseId, AuditResponseRepositoryError>;

    /// Append stored evidence files to a response.
    async fn attach_files(
        &self,
        response_id: ResponseId,
        files: &[EvidenceFile],
    ) -> Result<(), AuditResponseRepositoryError>;

    /// Every response of `session` joined with its control, by response id.
    async fn list_answered(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<AnsweredControl>, AuditResponseRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditResponseRepository;

#[async_trait]
impl AuditResponseRepository for FixtureAuditResponseRepository {
    async fn find(
        &self,
        _session: &SessionToken,
        _control_id: ControlId,
    ) -> Result<Option<StoredResponse>, AuditResponseRepositoryError> {
        Ok(None)
    }

    async fn upsert(
        &self,
        _upsert: &ResponseUpsert,
    ) -> Result<ResponseId, AuditResponseRepositoryError> {
        Ok(ResponseId::new(1))
    }

    async fn attach_files(
        &self,
        _response_id: ResponseId,
        _files: &[EvidenceFile],
    ) -> Result<(), AuditResponseRepositoryError> {
        Ok(())
    }

    async fn list_answered(
        &self,
        _session: &SessionToken,
    ) -> Result<Vec<AnsweredControl>, AuditResponseRepositoryError> {
        Ok(Vec::new())
    }
}
