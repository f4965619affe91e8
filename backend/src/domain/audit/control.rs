//! Catalogue controls.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Integer identity of a catalogue control.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ControlId(i32);

impl ControlId {
    /// Wrap a raw control id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw integer value as stored in the catalogue.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A control question from the reference catalogue.
///
/// `framework` is a free-text tag that sessions match loosely through
/// [`super::FrameworkMapping`] patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub id: ControlId,
    #[serde(alias = "control_name")]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub framework: String,
    #[serde(default, alias = "risk_level")]
    pub risk_level: String,
    #[serde(default)]
    pub question: String,
}

/// Distinct non-empty values present in the catalogue, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueFacets {
    pub frameworks: Vec<String>,
    pub categories: Vec<String>,
    pub risk_levels: Vec<String>,
}
