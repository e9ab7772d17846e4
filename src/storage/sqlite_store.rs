//! SQLite scan ledger.
//!
//! Persists scan records to a single `scan_history` table:
//! - id: INTEGER PRIMARY KEY AUTOINCREMENT (never reused)
//! - type: category name
//! - createdAt: RFC 3339 UTC timestamp
//! - source: remote, fallback or manual (NULL on legacy rows)
//!
//! One connection is shared behind a mutex and every statement runs on the
//! blocking thread pool, which gives single-writer discipline and keeps
//! readers from observing a half-written row.

use super::{
    format_timestamp, next_timestamp, normalize_filter, parse_timestamp, Clock, ResultStore,
    ScanRecord, SystemClock,
};
use crate::error::{StorageError, StorageResult};
use crate::types::{Category, RecordId, Source};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

struct Ledger {
    conn: Connection,
    initialized: bool,
    last_issued: Option<DateTime<Utc>>,
}

/// Database handle. Open once per process, share across callers.
pub struct SqliteStore {
    ledger: Arc<Mutex<Ledger>>,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Open (or create) the ledger file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StorageError::Unavailable(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "opened scan ledger");

        Self::from_connection(conn)
    }

    /// Open a private in-memory ledger.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(Self {
            ledger: Arc::new(Mutex::new(Ledger {
                conn,
                initialized: false,
                last_issued: None,
            })),
            clock: Arc::new(SystemClock),
        })
    }

    /// Use a different timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_ledger<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Ledger) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        tokio::task::spawn_blocking(move || {
            let mut guard = ledger
                .lock()
                .map_err(|_| StorageError::Unavailable("ledger lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("ledger task failed: {}", e)))?
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS scan_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            createdAt TEXT NOT NULL,
            source TEXT
        )",
        [],
    )?;

    // Ledgers created before provenance was tracked lack the column.
    let has_source = {
        let mut stmt = conn.prepare("PRAGMA table_info(scan_history)")?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        columns.iter().any(|c| c == "source")
    };

    if !has_source {
        info!("adding source column to scan_history");
        conn.execute("ALTER TABLE scan_history ADD COLUMN source TEXT", [])?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_scan_history_created
         ON scan_history(createdAt DESC, id DESC)",
        [],
    )?;

    Ok(())
}

fn latest_timestamp(conn: &Connection) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT createdAt FROM scan_history ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Decode one row, or `None` when it holds a value the ledger cannot
/// represent (an unknown category name or an unparseable timestamp).
fn record_from_parts(
    id: i64,
    category: String,
    created_at: String,
    source: Option<String>,
) -> Option<ScanRecord> {
    let category: Category = match category.parse() {
        Ok(category) => category,
        Err(e) => {
            warn!(id, error = %e, "skipping ledger row with unknown category");
            return None;
        }
    };
    let Some(created_at) = parse_timestamp(&created_at) else {
        warn!(id, raw = %created_at, "skipping ledger row with unreadable timestamp");
        return None;
    };

    Some(ScanRecord {
        id: RecordId::new(id),
        category,
        created_at,
        source: source.and_then(|s| s.parse::<Source>().ok()),
    })
}

fn not_initialized() -> StorageError {
    StorageError::Unavailable("ledger has not been initialized".to_string())
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn initialize(&self) -> StorageResult<()> {
        self.with_ledger(|ledger| {
            init_schema(&ledger.conn).map_err(|e| StorageError::Unavailable(e.to_string()))?;
            ledger.last_issued = latest_timestamp(&ledger.conn)
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            ledger.initialized = true;
            Ok(())
        })
        .await
    }

    async fn append(&self, category: &str, source: Source) -> StorageResult<ScanRecord> {
        let category: Category = category.parse()?;
        let clock = Arc::clone(&self.clock);

        self.with_ledger(move |ledger| {
            if !ledger.initialized {
                return Err(not_initialized());
            }

            let created_at = next_timestamp(clock.as_ref(), ledger.last_issued);
            ledger
                .conn
                .execute(
                    "INSERT INTO scan_history (type, createdAt, source) VALUES (?1, ?2, ?3)",
                    params![category.as_str(), format_timestamp(created_at), source.as_str()],
                )
                .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

            let id = ledger.conn.last_insert_rowid();
            ledger.last_issued = Some(created_at);

            Ok(ScanRecord {
                id: RecordId::new(id),
                category,
                created_at,
                source: Some(source),
            })
        })
        .await
    }

    async fn list(&self, filter: Option<&str>) -> StorageResult<Vec<ScanRecord>> {
        let needle = normalize_filter(filter);

        self.with_ledger(move |ledger| {
            if !ledger.initialized {
                return Err(not_initialized());
            }

            let mut stmt = ledger
                .conn
                .prepare_cached(
                    "SELECT id, type, createdAt, source
                     FROM scan_history
                     WHERE ?1 IS NULL OR instr(lower(type), ?1) > 0
                     ORDER BY createdAt DESC, id DESC",
                )
                .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

            let rows = stmt
                .query_map(params![needle], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                })
                .map_err(|e| StorageError::ReadFailed(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

            Ok(rows
                .into_iter()
                .filter_map(|(id, category, created_at, source)| {
                    record_from_parts(id, category, created_at, source)
                })
                .collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ScriptedClock;
    use super::*;
    use chrono::TimeZone;

    fn minute(m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, m, 0).unwrap()
    }

    async fn ready_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_append_then_list() {
        let store = ready_store().await;
        let record = store.append("Organic", Source::Remote).await.unwrap();

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed, vec![record.clone()]);
        assert_eq!(listed[0].category, Category::Organic);
        assert_eq!(listed[0].source, Some(Source::Remote));
    }

    #[tokio::test]
    async fn test_ids_are_fresh_and_increasing() {
        let store = ready_store().await;
        let mut seen = Vec::new();
        for name in ["Paper", "Plastic", "Organic", "Paper"] {
            let record = store.append(name, Source::Manual).await.unwrap();
            assert!(!seen.contains(&record.id));
            if let Some(last) = seen.last() {
                assert!(record.id > *last);
            }
            seen.push(record.id);
        }
    }

    #[tokio::test]
    async fn test_same_minute_ties_break_by_id() {
        let store = SqliteStore::open_in_memory()
            .unwrap()
            .with_clock(Arc::new(ScriptedClock::fixed(minute(30))));
        store.initialize().await.unwrap();

        let first = store.append("Paper", Source::Fallback).await.unwrap();
        let second = store.append("Plastic", Source::Fallback).await.unwrap();
        let third = store.append("Paper", Source::Fallback).await.unwrap();

        let ids: Vec<_> = store.list(None).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_clock_stepping_back_keeps_insertion_order() {
        let clock = ScriptedClock::new(vec![minute(40), minute(10)]);
        let store = SqliteStore::open_in_memory()
            .unwrap()
            .with_clock(Arc::new(clock));
        store.initialize().await.unwrap();

        let first = store.append("Paper", Source::Remote).await.unwrap();
        let second = store.append("Organic", Source::Remote).await.unwrap();

        assert!(second.created_at >= first.created_at);
        let listed = store.list(None).await.unwrap();
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_substring() {
        let store = ready_store().await;
        for name in ["Plastic", "Paper", "Organic"] {
            store.append(name, Source::Manual).await.unwrap();
        }

        let pl = store.list(Some("pl")).await.unwrap();
        assert_eq!(pl.len(), 1);
        assert_eq!(pl[0].category, Category::Plastic);

        let pa = store.list(Some("PA")).await.unwrap();
        assert_eq!(pa.len(), 1);
        assert_eq!(pa[0].category, Category::Paper);

        assert_eq!(store.list(Some("")).await.unwrap().len(), 3);
        assert!(store.list(Some("%")).await.unwrap().is_empty());
        assert!(store.list(Some("glass")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_category_writes_nothing() {
        let store = ready_store().await;
        let err = store.append("Metal", Source::Manual).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidCategory(_)));
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_before_initialize_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.append("Paper", Source::Manual).await,
            Err(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let store = ready_store().await;
        store
            .with_ledger(|ledger| {
                ledger
                    .conn
                    .execute("DROP TABLE scan_history", [])
                    .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(matches!(
            store.append("Paper", Source::Remote).await,
            Err(StorageError::WriteFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_and_durable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("waste.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.initialize().await.unwrap();
            store.append("Paper", Source::Remote).await.unwrap();
            store.initialize().await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        reopened.initialize().await.unwrap();
        let after = reopened.append("Organic", Source::Manual).await.unwrap();

        let listed = reopened.list(None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, after.id);
        assert_eq!(listed[1].category, Category::Paper);
    }

    #[tokio::test]
    async fn test_legacy_ledger_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waste.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE scan_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    type TEXT NOT NULL,
                    createdAt TEXT NOT NULL
                );
                INSERT INTO scan_history (type, createdAt) VALUES ('Plastic', '2024-11-02 06:41:09');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        store.initialize().await.unwrap();

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].source, None);
        assert_eq!(
            listed[0].created_at,
            Utc.with_ymd_and_hms(2024, 11, 2, 6, 41, 9).unwrap()
        );

        let added = store.append("Paper", Source::Fallback).await.unwrap();
        let listed = store.list(None).await.unwrap();
        assert_eq!(listed[0].id, added.id);
        assert_eq!(listed[0].source, Some(Source::Fallback));
    }

    #[tokio::test]
    async fn test_unknown_legacy_category_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waste.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE scan_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    type TEXT NOT NULL,
                    createdAt TEXT NOT NULL
                );
                INSERT INTO scan_history (type, createdAt) VALUES ('Paper', '2024-11-02 06:41:09');
                INSERT INTO scan_history (type, createdAt) VALUES ('Glass', '2024-11-02 06:45:00');
                INSERT INTO scan_history (type, createdAt) VALUES ('Organic', 'yesterday');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        store.initialize().await.unwrap();

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, Category::Paper);
        assert_eq!(listed[0].id, RecordId::new(1));

        let filtered = store.list(Some("pap")).await.unwrap();
        assert_eq!(filtered, listed);
        assert!(store.list(Some("glass")).await.unwrap().is_empty());

        let added = store.append("Plastic", Source::Manual).await.unwrap();
        assert_eq!(added.id, RecordId::new(4));
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_open_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let result = SqliteStore::open(blocker.join("waste.db"));
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_serialized() {
        let store = Arc::new(ready_store().await);
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let name = Category::ALL[i % 3].as_str();
                store.append(name, Source::Remote).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed.len(), 20);
        for pair in listed.windows(2) {
            assert!(pair[0].id > pair[1].id);
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
