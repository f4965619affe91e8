//! Port for persisting uploaded evidence files.

use async_trait::async_trait;

use crate::domain::audit::{EvidenceFile, ResponseId};

use super::define_port_error;

/// File extensions accepted as evidence, lowercase.
pub const ALLOWED_EVIDENCE_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// An uploaded file awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceUpload {
    /// Client-supplied filename.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl EvidenceUpload {
    /// Lowercase extension of the filename when it is an accepted evidence
    /// type.
    ///
    /// # Examples
    /// ```
    /// use audit_backend::domain::ports::EvidenceUpload;
    ///
    /// let upload = EvidenceUpload { filename: "Policy.PDF".into(), bytes: Vec::new() };
    /// assert_eq!(upload.accepted_extension().as_deref(), Some("pdf"));
    /// ```
    #[must_use]
    pub fn accepted_extension(&self) -> Option<String> {
        let (stem, extension) = self.filename.trim().rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        let extension = extension.to_ascii_lowercase();
        ALLOWED_EVIDENCE_EXTENSIONS
            .contains(&extension.as_str())
            .then_some(extension)
    }
}

define_port_error! {
    /// Errors raised by evidence file store adapters.
    pub enum EvidenceFileStoreError {
        /// Writing to the backing store failed.
        Io => "evidence store write failed: {message}",
        /// The upload was not an accepted evidence file.
        Rejected => "evidence upload rejected: {message}",
    }
}

/// Port persisting evidence under a response-scoped location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvidenceFileStore: Send + Sync {
    /// Persist `uploads` for `response_id`, returning one stored file per
    /// upload in order.
    async fn store(
        &self,
        response_id: ResponseId,
        uploads: Vec<EvidenceUpload>,
    ) -> Result<Vec<EvidenceFile>, EvidenceFileStoreError>;

    /// Remove previously stored files that no response row points at.
    async fn discard(&self, files: &[EvidenceFile]) -> Result<(), EvidenceFileStoreError>;
}

/// Fixture implementation that discards uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEvidenceFileStore;

#[async_trait]
impl EvidenceFileStore for FixtureEvidenceFileStore {
    async fn store(
        &self,
        _response_id: ResponseId,
        _uploads: Vec<EvidenceUpload>,
    ) -> Result<Vec<EvidenceFile>, EvidenceFileStoreError> {
        Ok(Vec::new())
    }

    async fn discard(&self, _files: &[EvidenceFile]) -> Result<(), EvidenceFileStoreError> {
        Ok(())
    }
}
