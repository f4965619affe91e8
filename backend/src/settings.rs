//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `AUDIT_*` environment variables and an optional
//! config file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::AppMode;

const DEFAULT_DATABASE_URL: &str = "audit_controls.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_EVIDENCE_DIR: &str = "evidence_files";
const DEFAULT_POOL_MAX_SIZE: u32 = 4;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("pool max size must be at least 1")]
    EmptyPool,
}

/// Startup configuration for the audit service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUDIT")]
pub struct AuditSettings {
    /// SQLite database path.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Run in demo mode: uploads disabled, demo session enabled.
    #[ortho_config(default = false)]
    pub demo: bool,
    /// Directory evidence uploads are written under.
    pub evidence_dir: Option<PathBuf>,
    /// JSON array of controls loaded when the catalogue is empty.
    pub controls_seed: Option<PathBuf>,
    /// Maximum pooled SQLite connections.
    pub pool_max_size: Option<u32>,
}

impl AuditSettings {
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .trim()
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    pub fn mode(&self) -> AppMode {
        AppMode::from_demo_flag(self.demo)
    }

    pub fn evidence_dir(&self) -> &Path {
        self.evidence_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_EVIDENCE_DIR))
    }

    pub fn controls_seed(&self) -> Option<&Path> {
        self.controls_seed.as_deref()
    }

    /// Pool size, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyPool`] when configured as `0`.
    pub fn pool_max_size(&self) -> Result<u32, SettingsError> {
        match self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE) {
            0 => Err(SettingsError::EmptyPool),
            size => Ok(size),
        }
    }
}
