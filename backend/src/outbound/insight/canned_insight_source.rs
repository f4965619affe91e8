//! Keyword-matched insight table used when no live insight provider exists.

use async_trait::async_trait;

use crate::domain::ports::{InsightRequest, InsightSource};

struct InsightBucket {
    keywords: &'static [&'static str],
    text: &'static str,
}

const BUCKETS: [InsightBucket; 5] = [
    InsightBucket {
        keywords: &["security", "attack", "defense", "defence", "robust"],
        text: "Security controls are where auditors look first for AI systems \
               exposed to adversarial input. Keep penetration test results and \
               automated monitoring alerts on file as evidence.",
    },
    InsightBucket {
        keywords: &["data", "privacy", "information"],
        text: "Data governance controls anchor privacy obligations such as GDPR \
               and CCPA. Evidence lineage, retention schedules and consent \
               records for every training and inference dataset.",
    },
    InsightBucket {
        keywords: &["monitor", "detect", "anomaly"],
        text: "Continuous monitoring lets issues surface before users report \
               them. Record thresholds, alert routing and the review cadence for \
               drift and anomaly reports.",
    },
    InsightBucket {
        keywords: &["document", "record", "report"],
        text: "Documentation controls carry audit readiness. Keep model cards, \
               decision logs and change history current so reviewers can trace \
               each release.",
    },
    InsightBucket {
        keywords: &["train", "awareness", "education"],
        text: "Training and awareness controls build the capability the other \
               controls depend on. Track attendance and refresh material when \
               regulation or tooling changes.",
    },
];

const DEFAULT_INSIGHT: &str = "This control supports AI governance compliance. \
                               Document each implementation step and keep a \
                               regular review cycle.";

/// Insight source picking a canned paragraph by keywords in the control name,
/// then its category.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedInsightSource;

impl CannedInsightSource {
    fn bucket_text(haystack: &str) -> Option<&'static str> {
        let lower = haystack.to_lowercase();
        BUCKETS
            .iter()
            .find(|bucket| bucket.keywords.iter().any(|word| lower.contains(word)))
            .map(|bucket| bucket.text)
    }

    /// Canned insight for `request`, always present.
    #[must_use]
    pub fn insight(request: &InsightRequest) -> String {
        let text = Self::bucket_text(&request.control_name)
            .or_else(|| Self::bucket_text(&request.category))
            .unwrap_or(DEFAULT_INSIGHT);
        format!(
            "{text} Context: {} risk, {} sector, {}.",
            request.risk_level.trim(),
            request.sector,
            request.region
        )
    }
}

#[async_trait]
impl InsightSource for CannedInsightSource {
    async fn insight_for(&self, request: &InsightRequest) -> Option<String> {
        Some(Self::insight(request))
    }
}
