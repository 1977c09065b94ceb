use std::collections::BTreeSet;

use tracing::debug;

use crate::store::entities::{LedgerEntry, MilestoneRecord};

use super::{EngineError, CRORE};

/// Finds the crossing date of every achieved crore that isn't recorded yet.
///
/// Entries are walked in date order with a running sum starting at `baseline`. A threshold is
/// crossed by the first entry that brings the running sum to or above it. Thresholds that no
/// entry reaches are skipped, the next recompute will try again. Thresholds are produced as the
/// running sum reaches them, so the work is bounded by the entries and `milestones_achieved`.
pub fn discover_milestones(
    entries: &[LedgerEntry],
    baseline: i64,
    milestones_achieved: i64,
    existing: &BTreeSet<i64>,
) -> Result<Vec<MilestoneRecord>, EngineError> {
    if milestones_achieved < 1 || entries.is_empty() {
        return Ok(vec![]);
    }

    let mut ordered = entries.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|v| v.date);

    let mut discovered = vec![];
    // Crore number of the lowest threshold no entry has reached yet.
    let mut next = 1;
    let mut cumulative = baseline;
    for entry in ordered {
        cumulative = cumulative
            .checked_add(entry.count)
            .ok_or(EngineError::TotalOutOfRange)?;
        while next <= milestones_achieved {
            let threshold = next
                .checked_mul(CRORE)
                .ok_or(EngineError::TotalOutOfRange)?;
            if cumulative < threshold {
                break;
            }
            if !existing.contains(&threshold) {
                discovered.push(MilestoneRecord {
                    milestone: threshold,
                    date: entry.date,
                });
            }
            next += 1;
        }
        if next > milestones_achieved {
            break;
        }
    }

    if next <= milestones_achieved {
        debug!(
            "No crossing found from {next} crore up to {milestones_achieved}, leaving them for the next recompute"
        );
    }

    Ok(discovered)
}
