//! Driving port for audit mutations: starting sessions and recording answers.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::audit::{AuditFilters, SessionToken, demo_session_token};

use super::EvidenceUpload;

/// Request to start a new audit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartAuditRequest {
    /// Display name; blank names default to the creation date.
    pub name: String,
    pub filters: AuditFilters,
}

/// Token of the session created by [`AuditSessionCommand::start_audit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartAuditResponse {
    pub session: SessionToken,
}

/// One submitted answer, as received from the form.
///
/// `confidence` and `evidence_date` are raw strings; the service applies the
/// neutral confidence fallback and validates the date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAnswerRequest {
    pub session: SessionToken,
    pub index: usize,
    pub answer: String,
    pub confidence: Option<String>,
    pub reference_text: String,
    pub evidence_notes: String,
    pub evidence_date: Option<String>,
    pub evidence_urls: Vec<String>,
    pub evidence_files: Vec<EvidenceUpload>,
}

/// Where the questionnaire continues after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAnswerOutcome {
    /// More controls remain; continue at `index`.
    Next { index: usize },
    /// No controls remain, or the index was already past the end.
    Summary,
}

/// Result of [`AuditSessionCommand::create_demo_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSessionResponse {
    pub session: SessionToken,
    /// `false` when the demo session already existed.
    pub created: bool,
}

/// Driving port for audit session mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSessionCommand: Send + Sync {
    /// Create a session with frozen filter criteria.
    async fn start_audit(&self, request: StartAuditRequest) -> Result<StartAuditResponse, Error>;

    /// Upsert the answer for the control at `request.index`.
    async fn submit_answer(
        &self,
        request: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerOutcome, Error>;

    /// Create the fixed demo session with its pre-filled answers, if absent.
    async fn create_demo_session(&self) -> Result<DemoSessionResponse, Error>;
}

/// Fixture implementation for handlers that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditSessionCommand;

#[async_trait]
impl AuditSessionCommand for FixtureAuditSessionCommand {
    async fn start_audit(&self, _request: StartAuditRequest) -> Result<StartAuditResponse, Error> {
        Ok(StartAuditResponse {
            session: SessionToken::generate(),
        })
    }

    async fn submit_answer(
        &self,
        _request: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerOutcome, Error> {
        Ok(SubmitAnswerOutcome::Summary)
    }

    async fn create_demo_session(&self) -> Result<DemoSessionResponse, Error> {
        Ok(DemoSessionResponse {
            session: demo_session_token(),
            created: false,
        })
    }
}
