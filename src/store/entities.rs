use chrono::Datelike;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::CRORE;

/// One day of the ledger. Entries are keyed by `date`, so writing a second entry for the same
/// day replaces the first one.
///
/// The year is not stored. It is always derived from `date` so the two can never disagree.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    #[serde(rename = "jaapCount")]
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LedgerEntry {
    /// Empty notes are stored as absent.
    pub fn new(date: NaiveDate, count: i64, notes: Option<String>) -> Self {
        Self {
            date,
            count,
            notes: notes.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn notes(&self) -> &str {
        self.notes.as_deref().unwrap_or_default()
    }
}

/// Date on which the cumulative count first reached `milestone`. `milestone` is always a positive
/// multiple of [CRORE].
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct MilestoneRecord {
    pub milestone: i64,
    pub date: NaiveDate,
}

impl MilestoneRecord {
    pub fn from_crore(crore: u32, date: NaiveDate) -> Self {
        Self {
            milestone: i64::from(crore) * CRORE,
            date,
        }
    }

    /// Milestone expressed in crores, the way it's shown to the user.
    pub fn crore(&self) -> i64 {
        self.milestone / CRORE
    }
}

pub const BASELINE_KEY: &str = "baseline";

/// Named value from the `settings` collection. Only the baseline is stored at the moment.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Setting {
    pub key: String,
    pub value: i64,
}

impl Setting {
    pub fn baseline(value: i64) -> Self {
        Self {
            key: BASELINE_KEY.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{LedgerEntry, MilestoneRecord};

    #[test]
    fn ledger_entry_uses_stored_field_names() {
        let entry = LedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            108,
            Some("morning".into()),
        );
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-02-01","jaapCount":108,"notes":"morning"}"#
        );
        assert_eq!(entry.year(), 2024);
    }

    #[test]
    fn ledger_entry_ignores_redundant_year() {
        let entry: LedgerEntry =
            serde_json::from_str(r#"{"date":"2023-12-31","jaapCount":5,"year":2024}"#).unwrap();
        assert_eq!(entry.year(), 2023);
        assert_eq!(entry.notes(), "");
    }

    #[test]
    fn blank_notes_are_dropped() {
        let entry = LedgerEntry::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1, Some("  ".into()));
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn milestone_from_crore() {
        let record = MilestoneRecord::from_crore(2, NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
        assert_eq!(record.milestone, 20_000_000);
        assert_eq!(record.crore(), 2);
    }
}
