//! Startup seeding of the control catalogue from a JSON file.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::info;

use audit_backend::domain::audit::Control;
use audit_backend::domain::ports::{ControlRepository, ControlRepositoryError};

/// Errors raised while seeding controls.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read control seed {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("control seed {path} is not a JSON array of controls: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] ControlRepositoryError),
}

/// Parse a JSON array of controls from `path`.
pub fn load_seed_controls(path: &Path) -> Result<Vec<Control>, SeedError> {
    let read_error = |source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "seed path must name a file",
        ))
    })?;
    let contents = Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name))
        .map_err(read_error)?;
    serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path` into `repository` when the catalogue is empty.
///
/// Returns the number of controls inserted.
pub async fn seed_controls(
    repository: &impl ControlRepository,
    path: &Path,
) -> Result<usize, SeedError> {
    let controls = load_seed_controls(path)?;
    let inserted = repository.seed_if_empty(&controls).await?;
    if inserted == 0 {
        info!(path = %path.display(), "control catalogue already populated; seed skipped");
    } else {
        info!(path = %path.display(), inserted, "seeded control catalogue");
    }
    Ok(inserted)
}
