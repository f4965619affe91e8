//! Session filter criteria and the catalogue query they produce.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::WILDCARD_PATTERN;

/// Sector label reported when a session carries no sector.
pub const GENERAL_SECTOR: &str = "General";
/// Region label reported when a session carries no region.
pub const GLOBAL_REGION: &str = "Global";

const ANY_SENTINELS: [&str; 5] = [
    "any",
    "all",
    "all frameworks",
    "all categories",
    "all risk levels",
];

/// Returns `true` when a filter value means "do not filter".
///
/// # Examples
/// ```
/// use audit_backend::domain::audit::is_unfiltered;
///
/// assert!(is_unfiltered(""));
/// assert!(is_unfiltered("All Categories"));
/// assert!(!is_unfiltered("Governance"));
/// ```
#[must_use]
pub fn is_unfiltered(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ANY_SENTINELS
            .iter()
            .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Filter criteria captured when an audit session is created.
///
/// Values are stored as entered; sentinels are interpreted when the control
/// query is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilters {
    pub framework: String,
    pub category: String,
    pub risk_level: String,
    pub sector: String,
    pub region: String,
}

impl AuditFilters {
    /// Sector label, defaulting to [`GENERAL_SECTOR`].
    #[must_use]
    pub fn sector_label(&self) -> &str {
        label_or(&self.sector, GENERAL_SECTOR)
    }

    /// Region label, defaulting to [`GLOBAL_REGION`].
    #[must_use]
    pub fn region_label(&self) -> &str {
        label_or(&self.region, GLOBAL_REGION)
    }
}

fn label_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if is_unfiltered(value) {
        fallback
    } else {
        value.trim()
    }
}

/// Query over the control catalogue.
///
/// The framework pattern is a case-insensitive SQL `LIKE` pattern; category and
/// risk level match exactly. Region and sector never narrow the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFilter {
    framework_pattern: Option<String>,
    category: Option<String>,
    risk_level: Option<String>,
}

impl ControlFilter {
    /// Build the query for a session's frozen criteria.
    #[must_use]
    pub fn new(framework_pattern: Option<&str>, filters: &AuditFilters) -> Self {
        Self {
            framework_pattern: framework_pattern.map(str::to_owned),
            category: exact(&filters.category),
            risk_level: exact(&filters.risk_level),
        }
    }

    /// Relaxed query matching every control with a framework tag.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            framework_pattern: Some(WILDCARD_PATTERN.to_owned()),
            category: None,
            risk_level: None,
        }
    }

    pub fn framework_pattern(&self) -> Option<&str> {
        self.framework_pattern.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn risk_level(&self) -> Option<&str> {
        self.risk_level.as_deref()
    }
}

fn exact(value: &str) -> Option<String> {
    (!is_unfiltered(value)).then(|| value.trim().to_owned())
}
