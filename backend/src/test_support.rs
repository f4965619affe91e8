//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The backend avoids direct `std::fs` calls. These helpers cover the
    //! read, write and existence checks test suites need through
    //! `cap_std::fs::Dir`.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a file's bytes through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use audit_backend::test_support::cap_fs::{read_file, write_file};
    ///
    /// let path = std::env::temp_dir().join("cap-fs-read-example.txt");
    /// write_file(&path, b"hello\n")?;
    /// assert_eq!(read_file(&path)?, b"hello\n");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read(Path::new(&file_name))
    }

    /// Write bytes to a file through `cap_std`.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod sqlite {
    //! Migrated SQLite databases in temporary directories.

    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use crate::outbound::persistence::{DbPool, PoolConfig, run_migrations};

    /// A migrated database file plus a pool over it. Dropping it deletes the
    /// directory.
    pub struct TempDatabase {
        _dir: TempDir,
        path: PathBuf,
        pub pool: DbPool,
    }

    impl TempDatabase {
        /// Create, migrate and pool a fresh database.
        ///
        /// # Panics
        ///
        /// Panics when the temporary directory, migrations or pool fail;
        /// tests cannot continue without a database.
        pub async fn new() -> Self {
            let dir = tempfile::tempdir().expect("temporary database directory");
            let path = dir.path().join("audit.db");
            let url = path.to_string_lossy().into_owned();
            run_migrations(&url).expect("migrations apply");
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
                .await
                .expect("pool builds");
            Self {
                _dir: dir,
                path,
                pool,
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }
}

pub mod catalogue {
    //! Control catalogues for scenario tests.

    use crate::domain::audit::{Control, ControlId};

    pub fn control(id: i32, name: &str, category: &str, framework: &str, risk: &str) -> Control {
        Control {
            id: ControlId::new(id),
            name: name.to_owned(),
            category: category.to_owned(),
            framework: framework.to_owned(),
            risk_level: risk.to_owned(),
            question: format!("Is \"{name}\" implemented and evidenced?"),
        }
    }

    /// Three EU AI Law controls interleaved with two NIST controls.
    pub fn eu_ai_act_scenario() -> Vec<Control> {
        vec![
            control(1, "Risk Management System", "Governance", "EU AI Law Article 9", "High"),
            control(2, "Model Monitoring", "Operations", "NIST AI RMF MANAGE 4.1", "Medium"),
            control(3, "Data Governance", "Data Management", "EU AI Law Article 10", "High"),
            control(4, "Incident Response", "Security", "NIST AI RMF MANAGE 2.3", "High"),
            control(5, "Technical Documentation", "Documentation", "EU AI Law Article 11", "Medium"),
        ]
    }
}
