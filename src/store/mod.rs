//! Storage is organized through the [LedgerStore] contract.
//! The basic idea is:
//!   - There are three keyed collections: `ledger` (by date), `milestones` (by threshold) and
//!     `settings` (by name).
//!   - Every write is an upsert by primary key. Writing the same key twice leaves one record.
//!   - Listing returns records ordered by key, so callers never need to sort them again.
//!
//! [json_store::JsonStore] keeps the collections on disk, [memory_store::MemoryStore] keeps them
//! in memory and is mostly useful for tests.

pub mod entities;
pub mod json_store;
pub mod memory_store;

use std::{future::Future, ops::Deref};

use chrono::NaiveDate;
use thiserror::Error;

use entities::{LedgerEntry, MilestoneRecord, Setting, BASELINE_KEY};

/// Any failure to read or write the store. Unavailable storage and corrupted records are
/// reported the same way to the user, the variants only exist for logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage for {collection} is unavailable: {source}")]
    Io {
        collection: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupted {collection} collection: {reason}")]
    Corrupted {
        collection: &'static str,
        reason: String,
    },
}

/// Interface for abstracting storage of the ledger, milestones and settings.
pub trait LedgerStore {
    fn get_entry(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<LedgerEntry>, StoreError>>;

    /// Inserts the entry or replaces the one with the same date.
    fn put_entry(&self, entry: LedgerEntry) -> impl Future<Output = Result<(), StoreError>>;

    /// All entries ordered by date ascending.
    fn list_entries(&self) -> impl Future<Output = Result<Vec<LedgerEntry>, StoreError>>;

    /// All entries ordered by date descending.
    fn list_entries_desc(&self) -> impl Future<Output = Result<Vec<LedgerEntry>, StoreError>> {
        async {
            let mut entries = self.list_entries().await?;
            entries.reverse();
            Ok(entries)
        }
    }

    fn get_milestone(
        &self,
        milestone: i64,
    ) -> impl Future<Output = Result<Option<MilestoneRecord>, StoreError>>;

    /// Inserts the record or replaces the one with the same threshold.
    fn put_milestone(
        &self,
        record: MilestoneRecord,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Upserts every record. Backends that can write them in one go should override this.
    fn put_milestones(
        &self,
        records: Vec<MilestoneRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> {
        async move {
            for record in records {
                self.put_milestone(record).await?;
            }
            Ok(())
        }
    }

    /// All milestone records ordered by threshold ascending.
    fn list_milestones(&self) -> impl Future<Output = Result<Vec<MilestoneRecord>, StoreError>>;

    fn get_setting(&self, key: &str) -> impl Future<Output = Result<Option<Setting>, StoreError>>;

    fn put_setting(&self, setting: Setting) -> impl Future<Output = Result<(), StoreError>>;
}

impl<T: Deref> LedgerStore for T
where
    T::Target: LedgerStore,
{
    fn get_entry(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<LedgerEntry>, StoreError>> {
        self.deref().get_entry(date)
    }

    fn put_entry(&self, entry: LedgerEntry) -> impl Future<Output = Result<(), StoreError>> {
        self.deref().put_entry(entry)
    }

    fn list_entries(&self) -> impl Future<Output = Result<Vec<LedgerEntry>, StoreError>> {
        self.deref().list_entries()
    }

    fn list_entries_desc(&self) -> impl Future<Output = Result<Vec<LedgerEntry>, StoreError>> {
        self.deref().list_entries_desc()
    }

    fn get_milestone(
        &self,
        milestone: i64,
    ) -> impl Future<Output = Result<Option<MilestoneRecord>, StoreError>> {
        self.deref().get_milestone(milestone)
    }

    fn put_milestone(
        &self,
        record: MilestoneRecord,
    ) -> impl Future<Output = Result<(), StoreError>> {
        self.deref().put_milestone(record)
    }

    fn put_milestones(
        &self,
        records: Vec<MilestoneRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> {
        self.deref().put_milestones(records)
    }

    fn list_milestones(&self) -> impl Future<Output = Result<Vec<MilestoneRecord>, StoreError>> {
        self.deref().list_milestones()
    }

    fn get_setting(&self, key: &str) -> impl Future<Output = Result<Option<Setting>, StoreError>> {
        self.deref().get_setting(key)
    }

    fn put_setting(&self, setting: Setting) -> impl Future<Output = Result<(), StoreError>> {
        self.deref().put_setting(setting)
    }
}

/// Baseline is optional in the store. A missing one means the ledger started from zero.
pub async fn read_baseline(store: &impl LedgerStore) -> Result<i64, StoreError> {
    Ok(store
        .get_setting(BASELINE_KEY)
        .await?
        .map(|v| v.value)
        .unwrap_or(0))
}
