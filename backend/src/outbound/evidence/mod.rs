//! Evidence file storage adapters.

mod fs_evidence_store;

pub use fs_evidence_store::{FsEvidenceFileStore, open_evidence_store};
