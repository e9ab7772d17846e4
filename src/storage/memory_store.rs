//! In-memory scan ledger.
//!
//! Same contract as the SQLite store without durability across processes.

use super::{next_timestamp, normalize_filter, Clock, ResultStore, ScanRecord, SystemClock};
use crate::error::{StorageError, StorageResult};
use crate::types::{Category, RecordId, Source};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Ledger {
    initialized: bool,
    records: Vec<ScanRecord>,
    next_id: i64,
    last_issued: Option<DateTime<Utc>>,
}

/// A ledger that lives only as long as the process.
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store using the system clock.
    pub fn new() -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                next_id: 1,
                ..Ledger::default()
            }),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().map(|l| l.records.len()).unwrap_or(0)
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|_| StorageError::Unavailable("ledger lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn initialize(&self) -> StorageResult<()> {
        self.lock()?.initialized = true;
        Ok(())
    }

    async fn append(&self, category: &str, source: Source) -> StorageResult<ScanRecord> {
        let category: Category = category.parse()?;
        let mut ledger = self.lock()?;

        if !ledger.initialized {
            return Err(StorageError::Unavailable(
                "ledger has not been initialized".to_string(),
            ));
        }

        let created_at = next_timestamp(self.clock.as_ref(), ledger.last_issued);
        let record = ScanRecord {
            id: RecordId::new(ledger.next_id),
            category,
            created_at,
            source: Some(source),
        };

        ledger.next_id += 1;
        ledger.last_issued = Some(created_at);
        ledger.records.push(record.clone());

        Ok(record)
    }

    async fn list(&self, filter: Option<&str>) -> StorageResult<Vec<ScanRecord>> {
        let needle = normalize_filter(filter);
        let ledger = self.lock()?;

        if !ledger.initialized {
            return Err(StorageError::Unavailable(
                "ledger has not been initialized".to_string(),
            ));
        }

        let mut records: Vec<ScanRecord> = ledger
            .records
            .iter()
            .filter(|r| needle.as_deref().map_or(true, |n| r.matches(n)))
            .cloned()
            .collect();
        records.sort_by(ScanRecord::newest_first);

        Ok(records)
    }
}
