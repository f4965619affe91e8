//! Audit questionnaire domain types.
//!
//! Controls are read-only reference data. An audit session freezes the filter
//! criteria chosen at creation, and the applicable controls are re-derived from
//! those criteria each time the session is viewed. Responses hold at most one
//! scored answer per session and control.

mod comparison;
mod control;
mod demo;
mod filters;
mod framework_mapping;
mod progress;
mod response;
mod session;
mod summary;

pub use comparison::{ComparedControl, SessionComparison, SessionTotals};
pub use control::{CatalogueFacets, Control, ControlId};
pub use demo::{DEMO_ANSWERS, DEMO_SESSION_NAME, DemoAnswer, demo_filters, demo_session_token};
pub use filters::{AuditFilters, ControlFilter, GLOBAL_REGION, GENERAL_SECTOR, is_unfiltered};
pub use framework_mapping::{FrameworkMapping, WILDCARD_PATTERN};
pub use progress::{Progress, percentage};
pub use response::{
    AnswerClass, AnsweredControl, AuditResponse, DEFAULT_CONFIDENCE, EvidenceDateError,
    EvidenceFile, ResponseEvidence, ResponseId, ResponseUpsert, StoredResponse,
    normalise_evidence_urls, parse_confidence, parse_evidence_date,
};
pub use session::{AuditSession, AuditSessionDraft, SessionToken, default_session_name};
pub use summary::{AuditSummary, CategoryRollup};
