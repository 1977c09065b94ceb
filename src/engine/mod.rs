//! Reflection engine. Derives totals, progress and milestone crossings from a fresh snapshot of
//! the store every time it runs. It keeps no state of its own.

pub mod discovery;
pub mod totals;

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    store::{entities::MilestoneRecord, read_baseline, LedgerStore, StoreError},
    utils::time::date_to_record_name,
};

use discovery::discover_milestones;
use totals::{compute_totals, Totals};

/// One crore. Milestones are spaced by it and displayed in it.
pub const CRORE: i64 = 10_000_000;

/// Largest count a single entry may carry, in either direction.
pub const MAX_ENTRY_COUNT: i64 = 10 * CRORE;

/// Largest baseline that can be seeded.
pub const MAX_BASELINE: i64 = 1_000 * CRORE;

/// Lifetime totals beyond this, in either direction, are refused instead of being reflected.
pub const MAX_TOTAL: i64 = 10_000 * CRORE;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Counts add up past the supported total of {}", MAX_TOTAL)]
    TotalOutOfRange,
}

/// Everything the presentation layer needs to show after a change.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    pub totals: Totals,
    /// Every recorded milestone ordered by threshold, including the newly crossed ones.
    pub milestones: Vec<MilestoneRecord>,
    /// Milestones discovered and written during this run.
    pub newly_crossed: Vec<MilestoneRecord>,
}

/// Recomputes the reflection and records milestones that have been crossed since the last run.
///
/// New milestones are written before returning. Existing ones are never touched, so running this
/// repeatedly is safe. Any store failure or out of range total aborts the run before anything is
/// written.
#[instrument(skip(store))]
pub async fn recompute(
    store: &impl LedgerStore,
    reference_year: i32,
) -> Result<Reflection, EngineError> {
    let (entries, baseline, existing) = tokio::try_join!(
        store.list_entries(),
        read_baseline(store),
        store.list_milestones()
    )?;

    let totals = compute_totals(&entries, baseline, reference_year)?;

    let existing = existing
        .into_iter()
        .map(|v| v.milestone)
        .collect::<BTreeSet<_>>();
    let newly_crossed =
        discover_milestones(&entries, baseline, totals.milestones_achieved, &existing)?;

    if !newly_crossed.is_empty() {
        store.put_milestones(newly_crossed.clone()).await?;
    }
    for record in &newly_crossed {
        info!(
            "Reached {} crore on {}",
            record.crore(),
            date_to_record_name(record.date)
        );
    }

    let milestones = store.list_milestones().await?;

    Ok(Reflection {
        totals,
        milestones,
        newly_crossed,
    })
}
