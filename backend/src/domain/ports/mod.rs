//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`EvidenceFileStore`], [`InsightSource`]) are
//! implemented by outbound adapters; driving ports ([`AuditSessionCommand`],
//! [`AuditSessionQuery`]) are consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_response_repository;
mod audit_session_command;
mod audit_session_query;
mod audit_session_repository;
mod control_repository;
mod evidence_file_store;
mod insight_source;

#[cfg(test)]
pub use audit_response_repository::MockAuditResponseRepository;
pub use audit_response_repository::{
    AuditResponseRepository, AuditResponseRepositoryError, FixtureAuditResponseRepository,
};
#[cfg(test)]
pub use audit_session_command::MockAuditSessionCommand;
pub use audit_session_command::{
    AuditSessionCommand, DemoSessionResponse, FixtureAuditSessionCommand, StartAuditRequest,
    StartAuditResponse, SubmitAnswerOutcome, SubmitAnswerRequest,
};
#[cfg(test)]
pub use audit_session_query::MockAuditSessionQuery;
pub use audit_session_query::{
    AuditSessionPayload, AuditSessionQuery, ComparisonView, FilterOptions,
    FixtureAuditSessionQuery, GetQuestionRequest, QuestionOutcome, QuestionView, ResponsePayload,
    SummaryView,
};
#[cfg(test)]
pub use audit_session_repository::MockAuditSessionRepository;
pub use audit_session_repository::{
    AuditSessionRepository, AuditSessionRepositoryError, FixtureAuditSessionRepository,
};
#[cfg(test)]
pub use control_repository::MockControlRepository;
pub use control_repository::{
    ControlRepository, ControlRepositoryError, FixtureControlRepository,
};
#[cfg(test)]
pub use evidence_file_store::MockEvidenceFileStore;
pub use evidence_file_store::{
    ALLOWED_EVIDENCE_EXTENSIONS, EvidenceFileStore, EvidenceFileStoreError, EvidenceUpload,
    FixtureEvidenceFileStore,
};
#[cfg(test)]
pub use insight_source::MockInsightSource;
pub use insight_source::{FixtureInsightSource, InsightRequest, InsightSource};
