//! Mapping from framework labels offered to users onto catalogue tag patterns.
//!
//! Catalogue framework tags are free text ("EU AI Law Article 9", "NIST AI RMF
//! MAP 1.1", ...), so a label resolves to a `LIKE` pattern rather than an exact
//! value.

use super::is_unfiltered;

/// `LIKE` pattern matching every framework tag.
pub const WILDCARD_PATTERN: &str = "%";

const DEFAULT_ENTRIES: [(&str, &str); 12] = [
    ("EU AI Act (2023)", "%EU AI Law%"),
    ("NIST AI Risk Management Framework (AI RMF v1.0)", "%NIST%"),
    ("NIST AI RMF", "%NIST%"),
    ("ISO/IEC 42001", "%ISO/IEC%"),
    ("GDPR for AI", "%GDPR%"),
    ("MITRE ATLAS", "%MITRE ATLAS%"),
    ("OWASP Top 10 for LLMs", "%OWASP%"),
    ("UK FCA AI/ML Guidance", "%UK FCA%"),
    ("US Blueprint for AI Bill of Rights", "%US Blueprint%"),
    ("ISACA Audit Toolkit", "%ISACA%"),
    ("Canada Artificial Intelligence Act", "%Canada AI%"),
    ("Unified Framework (ASIMOV-AI)", WILDCARD_PATTERN),
];

/// Ordered label to pattern table.
///
/// # Examples
/// ```
/// use audit_backend::domain::audit::FrameworkMapping;
///
/// let mapping = FrameworkMapping::default();
/// assert_eq!(mapping.resolve("EU AI Act (2023)").as_deref(), Some("%EU AI Law%"));
/// assert_eq!(mapping.resolve("SOC 2").as_deref(), Some("%SOC 2%"));
/// assert_eq!(mapping.resolve("Any"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkMapping {
    entries: Vec<(String, String)>,
}

impl Default for FrameworkMapping {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES)
    }
}

impl FrameworkMapping {
    /// Build a mapping from `(label, pattern)` pairs, keeping their order.
    pub fn new<L, P>(entries: impl IntoIterator<Item = (L, P)>) -> Self
    where
        L: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, pattern)| (label.into(), pattern.into()))
                .collect(),
        }
    }

    /// Resolve a label into its match pattern.
    ///
    /// Returns `None` for blank labels and "any" sentinels. Labels missing from
    /// the table match as a substring.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<String> {
        if is_unfiltered(label) {
            return None;
        }
        let label = label.trim();
        let pattern = self
            .entries
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(label))
            .map_or_else(|| format!("%{label}%"), |(_, pattern)| pattern.clone());
        Some(pattern)
    }

    /// Labels in table order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }
}
