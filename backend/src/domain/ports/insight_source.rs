//! Port for the contextual insight shown beside a control question.

use async_trait::async_trait;

/// Context handed to the insight source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRequest {
    pub control_name: String,
    pub category: String,
    pub risk_level: String,
    pub sector: String,
    pub region: String,
}

/// Source of opaque insight text, passed through to views unmodified.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightSource: Send + Sync {
    /// Insight for the control, or `None` when the source has nothing to say.
    async fn insight_for(&self, request: &InsightRequest) -> Option<String>;
}

/// Fixture implementation that never offers an insight.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInsightSource;

#[async_trait]
impl InsightSource for FixtureInsightSource {
    async fn insight_for(&self, _request: &InsightRequest) -> Option<String> {
        None
    }
}
