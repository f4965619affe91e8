//! Aggregate scoring over a session's responses.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::{AnswerClass, AnsweredControl, Control, percentage};

/// Answer counts for one control category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRollup {
    pub category: String,
    pub total: usize,
    pub compliant: usize,
    pub partial: usize,
    pub non_compliant: usize,
    pub scored: usize,
    pub unclassified: usize,
}

impl CategoryRollup {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_owned(),
            ..Self::default()
        }
    }

    fn record(&mut self, class: AnswerClass) {
        self.total += 1;
        match class {
            AnswerClass::Compliant => self.compliant += 1,
            AnswerClass::Partial => self.partial += 1,
            AnswerClass::NonCompliant => self.non_compliant += 1,
            AnswerClass::Scored(_) => self.scored += 1,
            AnswerClass::Unclassified => self.unclassified += 1,
        }
    }
}

/// Completion, compliance and per-category counts for one session.
///
/// Completion only counts controls that are still applicable; compliance
/// counts every stored response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    /// Applicable controls for the session.
    pub total: usize,
    /// Stored responses for the session.
    pub answered: usize,
    /// Applicable controls that have a response.
    pub applicable_answered: usize,
    pub compliant: usize,
    pub partial: usize,
    pub non_compliant: usize,
    pub completion_percentage: u8,
    pub compliance_percentage: u8,
    /// Mean of numeric 1-5 answers over all responses.
    pub average_score: f64,
    /// Rollups in first-encounter order of responses by id.
    pub categories: Vec<CategoryRollup>,
}

impl AuditSummary {
    /// Score `responses` against the session's `applicable` controls.
    #[must_use]
    pub fn compute(applicable: &[Control], responses: &[AnsweredControl]) -> Self {
        let mut ordered: Vec<&AnsweredControl> = responses.iter().collect();
        ordered.sort_by_key(|answered| answered.response.id);

        let answered_ids: HashSet<_> = ordered
            .iter()
            .map(|answered| answered.control.id)
            .collect();
        let applicable_answered = applicable
            .iter()
            .filter(|control| answered_ids.contains(&control.id))
            .count();

        let mut categories: Vec<CategoryRollup> = Vec::new();
        let mut score_sum: u32 = 0;
        let (mut compliant, mut partial, mut non_compliant) = (0, 0, 0);
        for answered in &ordered {
            let class = answered.response.class();
            match class {
                AnswerClass::Compliant => compliant += 1,
                AnswerClass::Partial => partial += 1,
                AnswerClass::NonCompliant => non_compliant += 1,
                AnswerClass::Scored(score) => score_sum += u32::from(score),
                AnswerClass::Unclassified => {}
            }
            let category = answered.control.category.as_str();
            match categories
                .iter_mut()
                .find(|rollup| rollup.category == category)
            {
                Some(rollup) => rollup.record(class),
                None => {
                    let mut rollup = CategoryRollup::new(category);
                    rollup.record(class);
                    categories.push(rollup);
                }
            }
        }

        let answered = ordered.len();
        let average_score = if answered == 0 {
            0.0
        } else {
            f64::from(score_sum) / answered as f64
        };

        Self {
            total: applicable.len(),
            answered,
            applicable_answered,
            compliant,
            partial,
            non_compliant,
            completion_percentage: percentage(applicable_answered, applicable.len()),
            compliance_percentage: percentage(compliant, answered),
            average_score,
            categories,
        }
    }
}
