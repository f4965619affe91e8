//! Insight source adapters.

mod canned_insight_source;

pub use canned_insight_source::CannedInsightSource;
