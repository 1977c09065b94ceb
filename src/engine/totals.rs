use crate::{store::entities::LedgerEntry, utils::percentage::Percentage};

use super::{EngineError, CRORE, MAX_TOTAL};

/// Aggregates shown in the reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of counts logged during the reference year. Baseline is not included.
    pub year_total: i64,
    /// Baseline plus every count ever logged.
    pub lifetime_total: i64,
    /// Number of whole crores in `lifetime_total`.
    pub milestones_achieved: i64,
    /// The crore multiple the user is working towards.
    pub next_milestone: i64,
    /// Progress inside the current crore, in `[0, 100)`.
    pub progress: Percentage,
}

/// Computes the aggregates for `reference_year`. Sums are checked, a lifetime total outside of
/// `[-MAX_TOTAL, MAX_TOTAL]` is refused.
pub fn compute_totals(
    entries: &[LedgerEntry],
    baseline: i64,
    reference_year: i32,
) -> Result<Totals, EngineError> {
    let lifetime_total = checked_sum(baseline, entries.iter())?;
    let year_total = checked_sum(0, entries.iter().filter(|v| v.year() == reference_year))?;
    if !(-MAX_TOTAL..=MAX_TOTAL).contains(&lifetime_total) {
        return Err(EngineError::TotalOutOfRange);
    }

    // Euclidean division floors negative totals too, so progress stays within [0, 100).
    let milestones_achieved = lifetime_total.div_euclid(CRORE);
    let next_milestone = (milestones_achieved + 1) * CRORE;
    let progress = Percentage::ratio(lifetime_total - milestones_achieved * CRORE, CRORE);

    Ok(Totals {
        year_total,
        lifetime_total,
        milestones_achieved,
        next_milestone,
        progress,
    })
}

fn checked_sum<'a>(
    start: i64,
    mut entries: impl Iterator<Item = &'a LedgerEntry>,
) -> Result<i64, EngineError> {
    entries.try_fold(start, |sum, v| {
        sum.checked_add(v.count).ok_or(EngineError::TotalOutOfRange)
    })
}
