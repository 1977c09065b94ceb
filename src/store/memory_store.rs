use std::collections::BTreeMap;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{
    entities::{LedgerEntry, MilestoneRecord, Setting},
    LedgerStore, StoreError,
};

/// Keeps all collections in memory. Ordering comes from the [BTreeMap] keys, the same ordering
/// [super::json_store::JsonStore] keeps on disk.
#[derive(Default)]
pub struct MemoryStore {
    ledger: RwLock<BTreeMap<NaiveDate, LedgerEntry>>,
    milestones: RwLock<BTreeMap<i64, MilestoneRecord>>,
    settings: RwLock<BTreeMap<String, Setting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    async fn get_entry(&self, date: NaiveDate) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self.ledger.read().await.get(&date).cloned())
    }

    async fn put_entry(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        self.ledger.write().await.insert(entry.date, entry);
        Ok(())
    }

    async fn list_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self.ledger.read().await.values().cloned().collect())
    }

    async fn get_milestone(&self, milestone: i64) -> Result<Option<MilestoneRecord>, StoreError> {
        Ok(self.milestones.read().await.get(&milestone).copied())
    }

    async fn put_milestone(&self, record: MilestoneRecord) -> Result<(), StoreError> {
        self.milestones
            .write()
            .await
            .insert(record.milestone, record);
        Ok(())
    }

    async fn list_milestones(&self) -> Result<Vec<MilestoneRecord>, StoreError> {
        Ok(self.milestones.read().await.values().copied().collect())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, StoreError> {
        Ok(self.settings.read().await.get(key).cloned())
    }

    async fn put_setting(&self, setting: Setting) -> Result<(), StoreError> {
        self.settings
            .write()
            .await
            .insert(setting.key.clone(), setting);
        Ok(())
    }
}

/// Delegates to [MemoryStore] but fails every ledger listing and counts milestone writes.
#[cfg(test)]
#[derive(Default)]
pub struct UnreadableLedger {
    pub inner: MemoryStore,
    pub milestone_writes: AtomicUsize,
}

#[cfg(test)]
impl LedgerStore for UnreadableLedger {
    async fn get_entry(&self, date: NaiveDate) -> Result<Option<LedgerEntry>, StoreError> {
        self.inner.get_entry(date).await
    }

    async fn put_entry(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        self.inner.put_entry(entry).await
    }

    async fn list_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        Err(StoreError::Io {
            collection: "ledger",
            source: std::io::Error::other("disk went away"),
        })
    }

    async fn get_milestone(&self, milestone: i64) -> Result<Option<MilestoneRecord>, StoreError> {
        self.inner.get_milestone(milestone).await
    }

    async fn put_milestone(&self, record: MilestoneRecord) -> Result<(), StoreError> {
        self.milestone_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put_milestone(record).await
    }

    async fn list_milestones(&self) -> Result<Vec<MilestoneRecord>, StoreError> {
        self.inner.list_milestones().await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, StoreError> {
        self.inner.get_setting(key).await
    }

    async fn put_setting(&self, setting: Setting) -> Result<(), StoreError> {
        self.inner.put_setting(setting).await
    }
}
