//! Scored responses and their evidence.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Control, ControlId, SessionToken};

/// Confidence recorded when none, or an unparsable value, was submitted.
pub const DEFAULT_CONFIDENCE: i32 = 3;

/// Row identity of a stored response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ResponseId(i32);

impl ResponseId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ResponseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scoring bucket for a free-form answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerClass {
    /// `yes`, case-insensitively.
    Compliant,
    /// `partial`, case-insensitively.
    Partial,
    /// `no`, case-insensitively.
    NonCompliant,
    /// A numeric score from 1 to 5.
    Scored(u8),
    /// Anything else, including blank answers.
    Unclassified,
}

impl AnswerClass {
    /// Classify an answer value.
    ///
    /// # Examples
    /// ```
    /// use audit_backend::domain::audit::AnswerClass;
    ///
    /// assert_eq!(AnswerClass::of(" YES "), AnswerClass::Compliant);
    /// assert_eq!(AnswerClass::of("4"), AnswerClass::Scored(4));
    /// assert_eq!(AnswerClass::of("6"), AnswerClass::Unclassified);
    /// ```
    #[must_use]
    pub fn of(answer: &str) -> Self {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("yes") {
            return Self::Compliant;
        }
        if answer.eq_ignore_ascii_case("partial") {
            return Self::Partial;
        }
        if answer.eq_ignore_ascii_case("no") {
            return Self::NonCompliant;
        }
        match answer.parse::<u8>() {
            Ok(score @ 1..=5) => Self::Scored(score),
            _ => Self::Unclassified,
        }
    }
}

/// A file persisted by the evidence store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceFile {
    pub filename: String,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Stored answer for one control within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResponse {
    pub id: ResponseId,
    pub session: SessionToken,
    pub control_id: ControlId,
    pub answer: String,
    pub confidence: i32,
    pub reference_text: String,
    pub evidence_notes: String,
    pub evidence_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl AuditResponse {
    #[must_use]
    pub fn class(&self) -> AnswerClass {
        AnswerClass::of(&self.answer)
    }
}

/// Evidence children of a response. URLs are replaced on every submission;
/// files accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEvidence {
    pub urls: Vec<String>,
    pub files: Vec<EvidenceFile>,
}

/// A response loaded together with its evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub response: AuditResponse,
    pub evidence: ResponseEvidence,
}

/// A response joined with the control it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredControl {
    pub control: Control,
    pub response: AuditResponse,
}

/// Values written by one submission, keyed by session and control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseUpsert {
    pub session: SessionToken,
    pub control_id: ControlId,
    pub answer: String,
    pub confidence: i32,
    pub reference_text: String,
    pub evidence_notes: String,
    pub evidence_date: Option<NaiveDate>,
    pub evidence_urls: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Trim submitted URLs and drop blank entries, keeping submission order.
pub fn normalise_evidence_urls<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .filter_map(|url| {
            let trimmed = url.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect()
}

/// Parse a submitted confidence, falling back to [`DEFAULT_CONFIDENCE`].
#[must_use]
pub fn parse_confidence(raw: Option<&str>) -> i32 {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE)
}

/// Submitted evidence date that is neither blank nor `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("evidence date '{value}' must use the YYYY-MM-DD format")]
pub struct EvidenceDateError {
    pub value: String,
}

/// Parse a submitted evidence date.
///
/// # Examples
/// ```
/// use audit_backend::domain::audit::parse_evidence_date;
///
/// assert_eq!(parse_evidence_date(Some("")), Ok(None));
/// assert!(parse_evidence_date(Some("2025-02-30")).is_err());
/// ```
pub fn parse_evidence_date(raw: Option<&str>) -> Result<Option<NaiveDate>, EvidenceDateError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| EvidenceDateError {
            value: value.to_owned(),
        })
}
