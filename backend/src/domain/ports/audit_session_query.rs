//! Driving port for audit reads: filter options, questions and scoring.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::audit::{
    AuditFilters, AuditSession, AuditSummary, Control, DEFAULT_CONFIDENCE, EvidenceFile,
    FrameworkMapping, Progress, SessionComparison, SessionToken, StoredResponse,
};

/// Values offered for each start-audit filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub frameworks: Vec<String>,
    pub categories: Vec<String>,
    pub risk_levels: Vec<String>,
}

/// Serializable session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditSessionPayload {
    pub session_id: SessionToken,
    pub name: String,
    pub filters: AuditFilters,
    pub framework_pattern: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&AuditSession> for AuditSessionPayload {
    fn from(value: &AuditSession) -> Self {
        Self {
            session_id: value.token(),
            name: value.name().to_owned(),
            filters: value.filters().clone(),
            framework_pattern: value.framework_pattern().map(str::to_owned),
            created_at: value.created_at(),
        }
    }
}

/// Prior answer shown with a question; defaults when nothing was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub answer: String,
    pub confidence: i32,
    pub reference_text: String,
    pub evidence_notes: String,
    pub evidence_date: Option<NaiveDate>,
    pub evidence_urls: Vec<String>,
    pub evidence_files: Vec<EvidenceFile>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ResponsePayload {
    fn default() -> Self {
        Self {
            answer: String::new(),
            confidence: DEFAULT_CONFIDENCE,
            reference_text: String::new(),
            evidence_notes: String::new(),
            evidence_date: None,
            evidence_urls: Vec::new(),
            evidence_files: Vec::new(),
            updated_at: None,
        }
    }
}

impl From<StoredResponse> for ResponsePayload {
    fn from(value: StoredResponse) -> Self {
        let StoredResponse { response, evidence } = value;
        Self {
            answer: response.answer,
            confidence: response.confidence,
            reference_text: response.reference_text,
            evidence_notes: response.evidence_notes,
            evidence_date: response.evidence_date,
            evidence_urls: evidence.urls,
            evidence_files: evidence.files,
            updated_at: Some(response.updated_at),
        }
    }
}

/// A control question with its progress, prior answer and insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub session: AuditSessionPayload,
    pub index: usize,
    pub control: Control,
    pub progress: Progress,
    pub response: ResponsePayload,
    pub insight: Option<String>,
    pub sector: String,
    pub region: String,
}

/// Outcome of [`AuditSessionQuery::get_question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    Question(Box<QuestionView>),
    /// The index is past the last applicable control.
    Exhausted,
}

/// Request for one question of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetQuestionRequest {
    pub session: SessionToken,
    pub index: usize,
}

/// Scored summary of a session.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub session: AuditSessionPayload,
    pub summary: AuditSummary,
}

/// Two sessions compared control by control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub first: AuditSessionPayload,
    pub second: AuditSessionPayload,
    pub comparison: SessionComparison,
}

/// Driving port for audit session reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSessionQuery: Send + Sync {
    /// Framework labels and catalogue facets for the start form.
    async fn filter_options(&self) -> Result<FilterOptions, Error>;

    /// Controls applicable to the session, recomputed on every call.
    async fn list_applicable_controls(&self, session: &SessionToken)
    -> Result<Vec<Control>, Error>;

    /// The question at a zero-based index.
    async fn get_question(&self, request: GetQuestionRequest) -> Result<QuestionOutcome, Error>;

    /// Completion, compliance and per-category scoring.
    async fn summary(&self, session: &SessionToken) -> Result<SummaryView, Error>;

    /// All sessions, newest first.
    async fn list_sessions(&self) -> Result<Vec<AuditSessionPayload>, Error>;

    /// Side-by-side comparison of two sessions.
    async fn compare(
        &self,
        first: &SessionToken,
        second: &SessionToken,
    ) -> Result<ComparisonView, Error>;
}

/// Fixture implementation with no stored sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditSessionQuery;

#[async_trait]
impl AuditSessionQuery for FixtureAuditSessionQuery {
    async fn filter_options(&self) -> Result<FilterOptions, Error> {
        Ok(FilterOptions {
            frameworks: FrameworkMapping::default()
                .labels()
                .map(str::to_owned)
                .collect(),
            ..FilterOptions::default()
        })
    }

    async fn list_applicable_controls(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<Control>, Error> {
        Err(session_not_found(session))
    }

    async fn get_question(&self, request: GetQuestionRequest) -> Result<QuestionOutcome, Error> {
        Err(session_not_found(&request.session))
    }

    async fn summary(&self, session: &SessionToken) -> Result<SummaryView, Error> {
        Err(session_not_found(session))
    }

    async fn list_sessions(&self) -> Result<Vec<AuditSessionPayload>, Error> {
        Ok(Vec::new())
    }

    async fn compare(
        &self,
        first: &SessionToken,
        _second: &SessionToken,
    ) -> Result<ComparisonView, Error> {
        Err(session_not_found(first))
    }
}

fn session_not_found(session: &SessionToken) -> Error {
    Error::not_found("Audit session not found")
        .with_details(serde_json::json!({ "sessionId": session.to_string() }))
}
