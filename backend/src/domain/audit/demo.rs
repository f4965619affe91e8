//! Fixed demo session used in demo mode.

use uuid::Uuid;

use super::{AuditFilters, SessionToken};

pub const DEMO_SESSION_NAME: &str = "Demo Audit Session";

const DEMO_SESSION_UUID: Uuid = Uuid::from_u128(0x0de3_0a0d_17a4_4c1e_9a5b_5e55_1011_0001);

/// Token of the demo session; stable so repeated creation is idempotent.
#[must_use]
pub const fn demo_session_token() -> SessionToken {
    SessionToken::from_uuid(DEMO_SESSION_UUID)
}

/// Criteria of the demo session.
#[must_use]
pub fn demo_filters() -> AuditFilters {
    AuditFilters {
        framework: "EU AI Act (2023)".to_owned(),
        category: "All Categories".to_owned(),
        risk_level: "All Risk Levels".to_owned(),
        sector: "Technology".to_owned(),
        region: "United States".to_owned(),
    }
}

/// A pre-filled answer for one of the first demo controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAnswer {
    pub answer: &'static str,
    pub confidence: i32,
    pub evidence_notes: &'static str,
    /// Evidence date as days before the session's creation.
    pub evidence_age_days: i64,
}

/// Answers for the first three applicable controls, in order.
pub const DEMO_ANSWERS: [DemoAnswer; 3] = [
    DemoAnswer {
        answer: "Yes",
        confidence: 4,
        evidence_notes: "Risk management policy approved by the board and reviewed quarterly.",
        evidence_age_days: 30,
    },
    DemoAnswer {
        answer: "Partial",
        confidence: 3,
        evidence_notes: "Data governance procedures drafted; lineage tracking not yet rolled out.",
        evidence_age_days: 15,
    },
    DemoAnswer {
        answer: "Yes",
        confidence: 5,
        evidence_notes: "Model monitoring dashboards live with alerting on drift thresholds.",
        evidence_age_days: 7,
    },
];
