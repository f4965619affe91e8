//! Filesystem-backed `EvidenceFileStore` using capability-scoped directories.
//!
//! Files land under `<root>/response_<id>/<uuid>.<ext>`. The stored path is
//! recorded relative to the root so the evidence directory can move without
//! rewriting rows.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::audit::{EvidenceFile, ResponseId};
use crate::domain::ports::{EvidenceFileStore, EvidenceFileStoreError, EvidenceUpload};

const FALLBACK_FILENAME: &str = "evidence";

/// Evidence store writing into a directory opened once at startup.
#[derive(Clone)]
pub struct FsEvidenceFileStore {
    root: Arc<Dir>,
    clock: Arc<dyn Clock>,
}

impl FsEvidenceFileStore {
    /// Wrap an already opened evidence directory.
    pub fn new(root: Dir, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: Arc::new(root),
            clock,
        }
    }
}

/// Create `path` if needed and open it as the evidence root.
///
/// # Errors
///
/// Returns [`EvidenceFileStoreError::Io`] when the directory cannot be created
/// or opened.
pub fn open_evidence_store(
    path: &Path,
    clock: Arc<dyn Clock>,
) -> Result<FsEvidenceFileStore, EvidenceFileStoreError> {
    let io_error = |err: std::io::Error| {
        EvidenceFileStoreError::io(format!("evidence directory {}: {err}", path.display()))
    };
    Dir::create_ambient_dir_all(path, ambient_authority()).map_err(io_error)?;
    let root = Dir::open_ambient_dir(path, ambient_authority()).map_err(io_error)?;
    Ok(FsEvidenceFileStore::new(root, clock))
}

/// Client filename reduced to its final path component.
fn display_name(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() {
        FALLBACK_FILENAME.to_owned()
    } else {
        base.to_owned()
    }
}

/// Best-effort removal of stored files, by root-relative path.
fn remove_files<'a>(root: &Dir, paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    paths
        .into_iter()
        .filter_map(|path| match root.remove_file(path) {
            Ok(()) => None,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path, error = %err, "failed to remove evidence file");
                Some(path.to_owned())
            }
        })
        .collect()
}

fn write_upload(
    root: &Dir,
    directory: &str,
    upload: &EvidenceUpload,
    uploaded_at: DateTime<Utc>,
) -> Result<EvidenceFile, EvidenceFileStoreError> {
    let extension = upload.accepted_extension().ok_or_else(|| {
        EvidenceFileStoreError::rejected(format!("unsupported evidence file {}", upload.filename))
    })?;
    let file_path = format!("{directory}/{}.{extension}", Uuid::new_v4());
    root.write(&file_path, &upload.bytes)
        .map_err(|err| EvidenceFileStoreError::io(format!("write {file_path}: {err}")))?;
    debug!(stored = %file_path, bytes = upload.bytes.len(), "stored evidence file");
    Ok(EvidenceFile {
        filename: display_name(&upload.filename),
        file_path,
        uploaded_at,
    })
}

/// Write every upload or none: a failure removes the files already written.
fn write_uploads(
    root: &Dir,
    response_id: ResponseId,
    uploads: &[EvidenceUpload],
    uploaded_at: DateTime<Utc>,
) -> Result<Vec<EvidenceFile>, EvidenceFileStoreError> {
    let directory = format!("response_{response_id}");
    root.create_dir_all(&directory)
        .map_err(|err| EvidenceFileStoreError::io(format!("create {directory}: {err}")))?;

    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match write_upload(root, &directory, upload, uploaded_at) {
            Ok(file) => stored.push(file),
            Err(err) => {
                remove_files(root, stored.iter().map(|file| file.file_path.as_str()));
                return Err(err);
            }
        }
    }
    Ok(stored)
}

#[async_trait]
impl EvidenceFileStore for FsEvidenceFileStore {
    async fn store(
        &self,
        response_id: ResponseId,
        uploads: Vec<EvidenceUpload>,
    ) -> Result<Vec<EvidenceFile>, EvidenceFileStoreError> {
        if uploads.is_empty() {
            return Ok(Vec::new());
        }
        let root = Arc::clone(&self.root);
        let uploaded_at = self.clock.utc();

        tokio::task::spawn_blocking(move || write_uploads(&root, response_id, &uploads, uploaded_at))
            .await
            .map_err(|err| EvidenceFileStoreError::io(format!("evidence writer failed: {err}")))?
    }

    async fn discard(&self, files: &[EvidenceFile]) -> Result<(), EvidenceFileStoreError> {
        if files.is_empty() {
            return Ok(());
        }
        let root = Arc::clone(&self.root);
        let paths: Vec<String> = files.iter().map(|file| file.file_path.clone()).collect();

        let failed = tokio::task::spawn_blocking(move || {
            remove_files(&root, paths.iter().map(String::as_str))
        })
        .await
        .map_err(|err| EvidenceFileStoreError::io(format!("evidence remover failed: {err}")))?;
        if failed.is_empty() {
            Ok(())
        } else {
            Err(EvidenceFileStoreError::io(format!(
                "could not remove {}",
                failed.join(", ")
            )))
        }
    }
}
