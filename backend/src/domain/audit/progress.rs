//! Question progress arithmetic.

use serde::Serialize;
use utoipa::ToSchema;

/// Integer percentage of `part` over `whole`, truncating; 0 when `whole` is 0.
///
/// # Examples
/// ```
/// use audit_backend::domain::audit::percentage;
///
/// assert_eq!(percentage(1, 3), 33);
/// assert_eq!(percentage(3, 3), 100);
/// assert_eq!(percentage(0, 0), 0);
/// ```
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = part.min(whole).saturating_mul(100) / whole;
    u8::try_from(scaled).unwrap_or(100)
}

/// Position of a question within a session's applicable controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// One-based position of the question.
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Progress {
    /// Progress for the zero-based `index`; `None` once the index runs past the
    /// last control.
    #[must_use]
    pub fn at(index: usize, total: usize) -> Option<Self> {
        if index >= total {
            return None;
        }
        let current = index + 1;
        Some(Self {
            current,
            total,
            percentage: percentage(current, total),
            has_prev: index > 0,
            has_next: current < total,
        })
    }
}
