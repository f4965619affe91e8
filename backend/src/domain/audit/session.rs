//! Audit sessions and their opaque tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AuditFilters, ControlFilter};

/// Opaque identifier handed to users when an audit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Name given to sessions started without one: `Audit YYYY-MM-DD`.
#[must_use]
pub fn default_session_name(created_at: DateTime<Utc>) -> String {
    format!("Audit {}", created_at.format("%Y-%m-%d"))
}

/// Input payload for [`AuditSession::new`].
#[derive(Debug, Clone)]
pub struct AuditSessionDraft {
    pub token: SessionToken,
    pub name: String,
    pub filters: AuditFilters,
    pub framework_pattern: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A questionnaire run with its frozen filter snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSession {
    token: SessionToken,
    name: String,
    filters: AuditFilters,
    framework_pattern: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuditSession {
    /// Build a session, naming it after its creation date when the name is
    /// blank.
    #[must_use]
    pub fn new(draft: AuditSessionDraft) -> Self {
        let AuditSessionDraft {
            token,
            name,
            filters,
            framework_pattern,
            created_at,
        } = draft;
        let name = match name.trim() {
            "" => default_session_name(created_at),
            trimmed => trimmed.to_owned(),
        };
        Self {
            token,
            name,
            filters,
            framework_pattern,
            created_at,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filters(&self) -> &AuditFilters {
        &self.filters
    }

    /// Framework pattern resolved when the session was created.
    pub fn framework_pattern(&self) -> Option<&str> {
        self.framework_pattern.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Catalogue query derived from the frozen criteria.
    #[must_use]
    pub fn control_filter(&self) -> ControlFilter {
        ControlFilter::new(self.framework_pattern(), &self.filters)
    }
}
