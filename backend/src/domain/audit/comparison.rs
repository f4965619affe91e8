//! Side-by-side comparison of two sessions.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{AnswerClass, AnsweredControl, ControlId};

/// Response counts for one side of a comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub responses: usize,
    pub compliant: usize,
    pub partial: usize,
    pub non_compliant: usize,
}

impl SessionTotals {
    fn from_responses(responses: &[AnsweredControl]) -> Self {
        responses
            .iter()
            .fold(Self::default(), |mut totals, answered| {
                totals.responses += 1;
                match answered.response.class() {
                    AnswerClass::Compliant => totals.compliant += 1,
                    AnswerClass::Partial => totals.partial += 1,
                    AnswerClass::NonCompliant => totals.non_compliant += 1,
                    AnswerClass::Scored(_) | AnswerClass::Unclassified => {}
                }
                totals
            })
    }
}

/// Answers given to one control by each session, when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparedControl {
    pub control_id: ControlId,
    pub control_name: String,
    pub category: String,
    pub first: Option<String>,
    pub second: Option<String>,
}

/// Per-control answers ordered by control id, with per-session totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionComparison {
    pub first: SessionTotals,
    pub second: SessionTotals,
    pub controls: Vec<ComparedControl>,
}

impl SessionComparison {
    #[must_use]
    pub fn build(first: &[AnsweredControl], second: &[AnsweredControl]) -> Self {
        let mut controls: BTreeMap<ControlId, ComparedControl> = BTreeMap::new();
        for (side, responses) in [(Side::First, first), (Side::Second, second)] {
            for answered in responses {
                let entry = controls
                    .entry(answered.control.id)
                    .or_insert_with(|| ComparedControl {
                        control_id: answered.control.id,
                        control_name: answered.control.name.clone(),
                        category: answered.control.category.clone(),
                        first: None,
                        second: None,
                    });
                let answer = Some(answered.response.answer.clone());
                match side {
                    Side::First => entry.first = answer,
                    Side::Second => entry.second = answer,
                }
            }
        }

        Self {
            first: SessionTotals::from_responses(first),
            second: SessionTotals::from_responses(second),
            controls: controls.into_values().collect(),
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    First,
    Second,
}
