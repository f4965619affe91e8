//! Multipart parsing for questionnaire answers.
//!
//! Browsers post the answer form as `multipart/form-data` so evidence files
//! can ride along with the text fields. Unknown fields are drained and
//! ignored. File parts without a filename are the empty file input and are
//! skipped.

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt as _;
use serde_json::json;

use crate::domain::Error;
use crate::domain::audit::SessionToken;
use crate::domain::ports::{EvidenceUpload, SubmitAnswerRequest};

/// Size and count caps applied while streaming an answer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    pub text_field_bytes: usize,
    pub file_bytes: usize,
    pub max_files: usize,
    /// Cap on every part body combined, discarded files included.
    pub total_bytes: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            text_field_bytes: 64 * 1024,
            file_bytes: 16 * 1024 * 1024,
            max_files: 10,
            total_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Whether uploaded file bodies are kept or drained unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPolicy {
    Keep,
    Discard,
}

/// Raw answer fields as posted by the question form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub answer: String,
    pub confidence: Option<String>,
    /// Newer forms post the score as `response_score`; it wins over
    /// `confidence`.
    pub response_score: Option<String>,
    pub reference_text: String,
    pub evidence_notes: String,
    pub evidence_date: Option<String>,
    pub evidence_urls: Vec<String>,
    pub evidence_files: Vec<EvidenceUpload>,
    /// Set when [`UploadPolicy::Discard`] skipped at least one file.
    pub uploads_discarded: bool,
}

impl SubmissionForm {
    pub fn into_request(self, session: SessionToken, index: usize) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            session,
            index,
            answer: self.answer,
            confidence: self.response_score.or(self.confidence),
            reference_text: self.reference_text,
            evidence_notes: self.evidence_notes,
            evidence_date: self.evidence_date,
            evidence_urls: self.evidence_urls,
            evidence_files: self.evidence_files,
        }
    }
}

fn malformed(err: impl std::fmt::Display) -> Error {
    Error::invalid_request("The submitted form could not be read.")
        .with_details(json!({ "reason": err.to_string() }))
}

fn too_large(name: &str, limit: usize) -> Error {
    Error::invalid_request(format!("{name} exceeds the {limit} byte limit"))
        .with_details(json!({ "field": name, "limit": limit }))
}

/// Byte budget shared by every part of one form.
struct Budget {
    remaining: usize,
    total: usize,
}

impl Budget {
    fn spend(&mut self, len: usize) -> Result<(), Error> {
        self.remaining = self.remaining.checked_sub(len).ok_or_else(|| {
            Error::invalid_request(format!(
                "The submission exceeds the {} byte limit",
                self.total
            ))
            .with_details(json!({ "limit": self.total }))
        })?;
        Ok(())
    }
}

/// Stream one part, keeping its bytes only when `keep` is set.
async fn read_field(
    field: &mut Field,
    name: &str,
    limit: usize,
    budget: &mut Budget,
    keep: bool,
) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    let mut seen = 0_usize;
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        seen = seen.saturating_add(chunk.len());
        if seen > limit {
            return Err(too_large(name, limit));
        }
        budget.spend(chunk.len())?;
        if keep {
            bytes.extend_from_slice(&chunk);
        }
    }
    Ok(bytes)
}

fn text(name: &str, bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes).map_err(|_| {
        Error::invalid_request(format!("{name} must be UTF-8 text"))
            .with_details(json!({ "field": name }))
    })
}

fn is_evidence_file_field(name: &str) -> bool {
    matches!(name, "evidence_files[]" | "evidence_files")
}

/// Read every part of the answer form.
///
/// With [`UploadPolicy::Discard`] file bodies are drained without being
/// buffered and only `uploads_discarded` records that files were posted.
///
/// # Errors
///
/// Returns [`crate::domain::ErrorCode::InvalidRequest`] when the stream is
/// malformed, a text field is not UTF-8, a part or the whole form exceeds its
/// size limit, or more than `limits.max_files` files are posted.
pub async fn read_submission(
    mut payload: Multipart,
    limits: SubmissionLimits,
    uploads: UploadPolicy,
) -> Result<SubmissionForm, Error> {
    let mut form = SubmissionForm::default();
    let mut budget = Budget {
        remaining: limits.total_bytes,
        total: limits.total_bytes,
    };
    let mut files_seen = 0_usize;

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);

        if let Some(filename) = filename {
            let wanted = is_evidence_file_field(&name) && !filename.trim().is_empty();
            if wanted {
                files_seen += 1;
                if files_seen > limits.max_files {
                    return Err(Error::invalid_request(format!(
                        "At most {} evidence files can be uploaded at once",
                        limits.max_files
                    ))
                    .with_details(json!({ "field": name, "limit": limits.max_files })));
                }
            }
            let keep = wanted && uploads == UploadPolicy::Keep;
            let bytes = read_field(&mut field, &name, limits.file_bytes, &mut budget, keep).await?;
            if keep {
                form.evidence_files.push(EvidenceUpload { filename, bytes });
            } else if wanted {
                form.uploads_discarded = true;
            }
            continue;
        }

        let raw = read_field(&mut field, &name, limits.text_field_bytes, &mut budget, true).await?;
        let value = text(&name, raw)?;
        match name.as_str() {
            "response" => form.answer = value,
            "confidence" => form.confidence = Some(value),
            "response_score" => form.response_score = Some(value),
            "reference_text" => form.reference_text = value,
            "evidence_notes" => form.evidence_notes = value,
            "evidence_date" => form.evidence_date = Some(value),
            "evidence_urls[]" | "evidence_urls" => form.evidence_urls.push(value),
            _ => {}
        }
    }

    Ok(form)
}

#[cfg(test)]
#[path = "submission_tests.rs"]
pub(crate) mod tests;
