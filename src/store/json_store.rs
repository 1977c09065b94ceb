use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, instrument, warn};

use super::{
    entities::{LedgerEntry, MilestoneRecord, Setting},
    LedgerStore, StoreError,
};

/// Version of the on-disk documents. There is no migration logic, any other version is rejected.
pub const SCHEMA_VERSION: u32 = 1;

const LEDGER: &str = "ledger";
const MILESTONES: &str = "milestones";
const SETTINGS: &str = "settings";

/// Layout of every collection file. `records` are kept sorted by primary key.
#[derive(Serialize, Deserialize)]
struct CollectionDocument<R> {
    version: u32,
    records: R,
}

/// Record with a primary key inside its collection.
trait Keyed {
    type Key: Ord;

    fn key(&self) -> Self::Key;
}

impl Keyed for LedgerEntry {
    type Key = NaiveDate;

    fn key(&self) -> NaiveDate {
        self.date
    }
}

impl Keyed for MilestoneRecord {
    type Key = i64;

    fn key(&self) -> i64 {
        self.milestone
    }
}

impl Keyed for Setting {
    type Key = String;

    fn key(&self) -> String {
        self.key.clone()
    }
}

/// A single collection stored as `<name>.json`, guarded by `<name>.lock`.
///
/// The lock lives in a separate file because the data file is replaced by rename on every write.
struct Collection {
    name: &'static str,
    dir: PathBuf,
}

impl Collection {
    fn new(name: &'static str, dir: &Path) -> Self {
        Self {
            name,
            dir: dir.to_path_buf(),
        }
    }

    fn data_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            collection: self.name,
            source,
        }
    }

    fn corrupted(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Corrupted {
            collection: self.name,
            reason: reason.into(),
        }
    }

    /// Opens `<name>.lock` and waits for the lock off the runtime thread.
    async fn acquire_lock(&self, exclusive: bool) -> Result<File, StoreError> {
        let lock = File::options()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(format!("{}.lock", self.name)))
            .await
            .map_err(|e| self.io(e))?;

        tokio::task::spawn_blocking(move || {
            if exclusive {
                lock.lock_exclusive()?;
            } else {
                lock.lock_shared()?;
            }
            Ok::<_, std::io::Error>(lock)
        })
        .await
        .map_err(|e| self.io(std::io::Error::other(e)))?
        .map_err(|e| self.io(e))
    }

    #[instrument(skip(self), fields(collection = self.name))]
    async fn read_all<T: Keyed + DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        let lock = self.acquire_lock(false).await?;
        let result = self.read_unlocked().await;
        lock.unlock_async().await.map_err(|e| self.io(e))?;
        result
    }

    #[instrument(skip(self, records), fields(collection = self.name, count = records.len()))]
    async fn upsert<T: Keyed + Serialize + DeserializeOwned>(
        &self,
        records: Vec<T>,
    ) -> Result<(), StoreError> {
        // Semi-safe acquire-release for a collection. Readers and writers of other processes wait
        // until the whole read-modify-write is done.
        let lock = self.acquire_lock(true).await?;
        let result = self.upsert_unlocked(records).await;
        lock.unlock_async().await.map_err(|e| self.io(e))?;
        result
    }

    async fn read_unlocked<T: Keyed + DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        let path = self.data_path();
        let content = match tokio::fs::read(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No {path:?} yet, treating it as empty");
                return Ok(vec![]);
            }
            Err(e) => return Err(self.io(e)),
        };

        let document = serde_json::from_slice::<CollectionDocument<Vec<T>>>(&content)
            .map_err(|e| {
                warn!("Found illegal json in {path:?}: {e}");
                self.corrupted(e.to_string())
            })?;

        if document.version != SCHEMA_VERSION {
            warn!(
                "{path:?} has schema version {}, expected {SCHEMA_VERSION}",
                document.version
            );
            return Err(self.corrupted(format!(
                "unsupported schema version {}",
                document.version
            )));
        }

        let mut records = document.records;
        // Files edited by hand might not be ordered.
        records.sort_by_key(|v| v.key());
        Ok(records)
    }

    async fn upsert_unlocked<T: Keyed + Serialize + DeserializeOwned>(
        &self,
        updates: Vec<T>,
    ) -> Result<(), StoreError> {
        let mut records = self.read_unlocked::<T>().await?;
        for record in updates {
            let key = record.key();
            match records.binary_search_by(|v| v.key().cmp(&key)) {
                Ok(index) => records[index] = record,
                Err(index) => records.insert(index, record),
            }
        }
        self.write_unlocked(&records).await
    }

    /// Writes the document next to the collection and renames it over the old one, so a crash
    /// never leaves a half-written collection behind.
    async fn write_unlocked<T: Serialize>(&self, records: &[T]) -> Result<(), StoreError> {
        let document = CollectionDocument {
            version: SCHEMA_VERSION,
            records,
        };
        let buffer =
            serde_json::to_vec_pretty(&document).map_err(|e| self.corrupted(e.to_string()))?;

        let temporary = self.dir.join(format!("{}.json.tmp", self.name));
        let mut file = File::create(&temporary).await.map_err(|e| self.io(e))?;
        file.write_all(&buffer).await.map_err(|e| self.io(e))?;
        file.sync_all().await.map_err(|e| self.io(e))?;
        drop(file);

        tokio::fs::rename(&temporary, self.data_path())
            .await
            .map_err(|e| self.io(e))
    }
}

/// The main realization of [LedgerStore]. Every collection is a JSON document inside
/// `store_dir`.
pub struct JsonStore {
    ledger: Collection,
    milestones: Collection,
    settings: Collection,
}

impl JsonStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&store_dir).map_err(|source| StoreError::Io {
            collection: "store",
            source,
        })?;

        Ok(Self {
            ledger: Collection::new(LEDGER, &store_dir),
            milestones: Collection::new(MILESTONES, &store_dir),
            settings: Collection::new(SETTINGS, &store_dir),
        })
    }
}

impl LedgerStore for JsonStore {
    async fn get_entry(&self, date: NaiveDate) -> Result<Option<LedgerEntry>, StoreError> {
        let entries = self.ledger.read_all::<LedgerEntry>().await?;
        Ok(entries.into_iter().find(|v| v.date == date))
    }

    async fn put_entry(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        self.ledger.upsert(vec![entry]).await
    }

    async fn list_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        self.ledger.read_all().await
    }

    async fn get_milestone(&self, milestone: i64) -> Result<Option<MilestoneRecord>, StoreError> {
        let records = self.milestones.read_all::<MilestoneRecord>().await?;
        Ok(records.into_iter().find(|v| v.milestone == milestone))
    }

    async fn put_milestone(&self, record: MilestoneRecord) -> Result<(), StoreError> {
        self.milestones.upsert(vec![record]).await
    }

    async fn put_milestones(&self, records: Vec<MilestoneRecord>) -> Result<(), StoreError> {
        self.milestones.upsert(records).await
    }

    async fn list_milestones(&self) -> Result<Vec<MilestoneRecord>, StoreError> {
        self.milestones.read_all().await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, StoreError> {
        let settings = self.settings.read_all::<Setting>().await?;
        Ok(settings.into_iter().find(|v| v.key == key))
    }

    async fn put_setting(&self, setting: Setting) -> Result<(), StoreError> {
        self.settings.upsert(vec![setting]).await
    }
}
