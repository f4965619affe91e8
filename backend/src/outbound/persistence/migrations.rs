//! Embedded schema migrations applied at startup.

use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while bringing the schema up to date.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to open database {database_url}: {source}")]
    Connect {
        database_url: String,
        #[source]
        source: diesel::ConnectionError,
    },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending embedded migration and return how many ran.
///
/// Uses a blocking connection; call it before the pool is built or from
/// `spawn_blocking`.
pub fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn =
        SqliteConnection::establish(database_url).map_err(|source| MigrationError::Connect {
            database_url: database_url.to_owned(),
            source,
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn migrations_apply_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("migrations.db");
        let url = path.to_string_lossy();

        let first = run_migrations(&url).expect("first run");
        let second = run_migrations(&url).expect("second run");

        assert!(first >= 1);
        assert_eq!(second, 0);
    }
}
