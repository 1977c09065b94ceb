//! User-facing operations. Each one writes to the store and then recomputes the reflection, so
//! the caller always has something fresh to render.

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::{
    engine::{recompute, Reflection, MAX_BASELINE, MAX_ENTRY_COUNT},
    store::{
        entities::{LedgerEntry, MilestoneRecord, Setting},
        LedgerStore,
    },
    utils::time::{format_display_date, parse_display_date},
};

/// A milestone entered by hand: `<crore number>=<DD-MM-YYYY>`, e.g. `2=15-03-2023`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualMilestone {
    pub crore: u32,
    pub date: NaiveDate,
}

impl ManualMilestone {
    pub fn record(&self) -> MilestoneRecord {
        MilestoneRecord::from_crore(self.crore, self.date)
    }
}

impl FromStr for ManualMilestone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((crore, date)) = s.split_once('=') else {
            bail!("Expected <crore>=<DD-MM-YYYY>, got \"{s}\"");
        };
        let crore = crore
            .trim()
            .parse::<u32>()
            .map_err(|e| anyhow!("Can't parse crore number \"{crore}\": {e}"))?;
        if crore == 0 {
            bail!("Crore number must be at least 1");
        }
        let date = parse_display_date(date.trim())?;
        Ok(Self { crore, date })
    }
}

/// Writes or overwrites the entry for `date` and recomputes the reflection. Counts beyond
/// [MAX_ENTRY_COUNT] are refused before anything is written.
#[instrument(skip(store, notes))]
pub async fn upsert_entry(
    store: &impl LedgerStore,
    date: NaiveDate,
    count: i64,
    notes: Option<String>,
    reference_year: i32,
) -> Result<Reflection> {
    if !(-MAX_ENTRY_COUNT..=MAX_ENTRY_COUNT).contains(&count) {
        bail!("Count {count} is outside of ±{MAX_ENTRY_COUNT}");
    }
    store
        .put_entry(LedgerEntry::new(date, count, notes))
        .await?;
    info!("Saved entry");
    Ok(recompute(store, reference_year).await?)
}

/// Overwrites the baseline. Zero is a valid value and resets it.
#[instrument(skip(store))]
pub async fn seed_baseline(store: &impl LedgerStore, count: i64) -> Result<()> {
    if !(0..=MAX_BASELINE).contains(&count) {
        bail!("Baseline {count} is outside of 0..={MAX_BASELINE}");
    }
    store.put_setting(Setting::baseline(count)).await?;
    info!("Baseline set");
    Ok(())
}

/// Writes the milestone as given, replacing whatever was recorded for that threshold.
#[instrument(skip(store))]
pub async fn seed_milestone(store: &impl LedgerStore, milestone: ManualMilestone) -> Result<()> {
    let record = milestone.record();
    if let Some(previous) = store.get_milestone(record.milestone).await? {
        warn!(
            "Replacing {} crore dated {}",
            previous.crore(),
            format_display_date(previous.date)
        );
    }
    store.put_milestone(record).await?;
    Ok(())
}

/// Seeds the baseline (when given) and every manual milestone, then recomputes.
pub async fn seed(
    store: &impl LedgerStore,
    baseline: Option<i64>,
    milestones: &[ManualMilestone],
    reference_year: i32,
) -> Result<Reflection> {
    if let Some(baseline) = baseline {
        seed_baseline(store, baseline).await?;
    }
    for milestone in milestones {
        seed_milestone(store, *milestone).await?;
    }
    Ok(recompute(store, reference_year).await?)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use crate::{
        engine::{MAX_BASELINE, MAX_ENTRY_COUNT},
        store::{
            entities::MilestoneRecord, memory_store::MemoryStore, read_baseline, LedgerStore,
        },
    };

    use super::{seed, seed_baseline, upsert_entry, ManualMilestone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn manual_milestone_parsing() {
        assert_eq!(
            "2=15-03-2023".parse::<ManualMilestone>().unwrap(),
            ManualMilestone {
                crore: 2,
                date: date(2023, 3, 15)
            }
        );
        assert_eq!(
            " 3 = 01-01-2020 ".parse::<ManualMilestone>().unwrap().crore,
            3
        );

        for value in ["0=15-03-2023", "2", "x=15-03-2023", "2=2023-03-15", "-1=15-03-2023"] {
            assert!(value.parse::<ManualMilestone>().is_err(), "{value}");
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_day() -> Result<()> {
        let store = MemoryStore::new();

        upsert_entry(&store, date(2024, 5, 1), 1_000, Some("a".into()), 2024).await?;
        let reflection =
            upsert_entry(&store, date(2024, 5, 1), 2_500, Some("b".into()), 2024).await?;

        let entries = store.list_entries().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 2_500);
        assert_eq!(entries[0].notes(), "b");
        assert_eq!(reflection.totals.lifetime_total, 2_500);
        Ok(())
    }

    #[tokio::test]
    async fn test_manual_seed_overwrites_discovered_milestone() -> Result<()> {
        let store = MemoryStore::new();
        upsert_entry(&store, date(2024, 1, 1), 12_000_000, None, 2024).await?;
        let reflection = upsert_entry(&store, date(2024, 1, 2), 9_000_000, None, 2024).await?;
        assert_eq!(
            reflection.milestones[1],
            MilestoneRecord::from_crore(2, date(2024, 1, 2))
        );

        let manual = "2=15-03-2023".parse::<ManualMilestone>()?;
        let reflection = seed(&store, None, &[manual], 2024).await?;
        assert_eq!(
            reflection.milestones[1],
            MilestoneRecord::from_crore(2, date(2023, 3, 15))
        );

        // A later change does not bring back the discovered date.
        let reflection = upsert_entry(&store, date(2024, 1, 3), 1, None, 2024).await?;
        assert_eq!(
            reflection.milestones[1],
            MilestoneRecord::from_crore(2, date(2023, 3, 15))
        );
        assert!(reflection.newly_crossed.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_baseline_feeds_totals() -> Result<()> {
        let store = MemoryStore::new();
        upsert_entry(&store, date(2024, 1, 1), 500_000, None, 2024).await?;

        let reflection = seed(&store, Some(9_800_000), &[], 2024).await?;

        assert_eq!(read_baseline(&store).await?, 9_800_000);
        assert_eq!(reflection.totals.lifetime_total, 10_300_000);
        assert_eq!(reflection.totals.year_total, 500_000);
        assert_eq!(
            reflection.newly_crossed,
            vec![MilestoneRecord::from_crore(1, date(2024, 1, 1))]
        );

        let reflection = seed(&store, Some(0), &[], 2024).await?;
        assert_eq!(read_baseline(&store).await?, 0);
        assert_eq!(reflection.totals.lifetime_total, 500_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_counts_are_not_written() -> Result<()> {
        let store = MemoryStore::new();

        for count in [MAX_ENTRY_COUNT + 1, -MAX_ENTRY_COUNT - 1, i64::MAX] {
            assert!(upsert_entry(&store, date(2024, 1, 1), count, None, 2024)
                .await
                .is_err());
        }
        assert!(store.list_entries().await?.is_empty());

        for count in [MAX_BASELINE + 1, -1, i64::MAX] {
            assert!(seed_baseline(&store, count).await.is_err());
        }
        assert_eq!(read_baseline(&store).await?, 0);

        let reflection =
            upsert_entry(&store, date(2024, 1, 1), MAX_ENTRY_COUNT, None, 2024).await?;
        assert_eq!(reflection.milestones.len(), 10);
        seed_baseline(&store, MAX_BASELINE).await?;
        Ok(())
    }
}
