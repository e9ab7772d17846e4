//! Scan ledger persistence.
//!
//! The ledger is append-only: records are created once per completed scan
//! and never updated. [`ResultStore`] is the seam the workflow and the
//! history view depend on; [`SqliteStore`] is the durable implementation and
//! [`MemoryStore`] a drop-in substitute for tests and ephemeral sessions.
//!
//! Timestamps are issued by the store, never by callers, from a single
//! [`Clock`] while the store's write lock is held, so `created_at` order
//! always agrees with `id` order.

mod memory_store;
mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

use crate::error::StorageResult;
use crate::types::{Category, RecordId, Source};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// A persisted scan record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    /// Store-assigned surrogate key.
    pub id: RecordId,
    /// Recorded waste category.
    pub category: Category,
    /// Insertion time, UTC.
    pub created_at: DateTime<Utc>,
    /// Provenance; `None` for rows written before provenance was tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl ScanRecord {
    /// Ledger ordering: newest first, ties broken by the higher id.
    pub fn newest_first(a: &ScanRecord, b: &ScanRecord) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }

    /// Whether the category name contains `needle` (already lowercased).
    fn matches(&self, needle: &str) -> bool {
        self.category.as_str().to_lowercase().contains(needle)
    }
}

/// Trait for scan ledger implementations.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Ensure the backing schema exists. Idempotent, never erases records.
    async fn initialize(&self) -> StorageResult<()>;

    /// Validate `category` and append a new record for it.
    ///
    /// Returns once the record is durable.
    async fn append(&self, category: &str, source: Source) -> StorageResult<ScanRecord>;

    /// List records newest first, optionally restricted to categories that
    /// contain `filter` (case-insensitive).
    async fn list(&self, filter: Option<&str>) -> StorageResult<Vec<ScanRecord>>;
}

/// Source of insertion timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Issue the next insertion timestamp.
///
/// Truncated to the stored precision and never earlier than the previous
/// one, so a clock stepping backwards cannot reorder the ledger.
pub(crate) fn next_timestamp(clock: &dyn Clock, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = clock.now().trunc_subsecs(3);
    match last {
        Some(last) if last > now => last,
        _ => now,
    }
}

/// Render a timestamp the way the ledger stores it.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and the legacy `YYYY-MM-DD HH:MM:SS` form, which was
/// always written from a UTC clock.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Normalize a user-supplied filter; blank means no filter.
pub(crate) fn normalize_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
}

/// Per-category counts over a ledger listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub paper: usize,
    pub plastic: usize,
    pub organic: usize,
    pub total: usize,
}

impl CategoryStats {
    /// Count the records of each category.
    pub fn from_records(records: &[ScanRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            match record.category {
                Category::Paper => stats.paper += 1,
                Category::Plastic => stats.plastic += 1,
                Category::Organic => stats.organic += 1,
            }
            stats.total += 1;
        }
        stats
    }

    /// Count for one category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Paper => self.paper,
            Category::Plastic => self.plastic,
            Category::Organic => self.organic,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Clock;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    /// A clock that returns scripted instants, repeating the last one.
    pub struct ScriptedClock {
        instants: Mutex<Vec<DateTime<Utc>>>,
    }

    impl ScriptedClock {
        pub fn new(mut instants: Vec<DateTime<Utc>>) -> Self {
            instants.reverse();
            Self {
                instants: Mutex::new(instants),
            }
        }

        pub fn fixed(at: DateTime<Utc>) -> Self {
            Self::new(vec![at])
        }
    }

    impl Clock for ScriptedClock {
        fn now(&self) -> DateTime<Utc> {
            let mut instants = self.instants.lock().unwrap();
            if instants.len() > 1 {
                instants.pop().unwrap()
            } else {
                instants[0]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedClock;
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        let ts = at(8, 15, 2) + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(ts), "2025-03-14T08:15:02.123Z");
        assert_eq!(parse_timestamp("2025-03-14T08:15:02.123Z"), Some(ts));
    }

    #[test]
    fn test_legacy_timestamp_is_utc() {
        assert_eq!(parse_timestamp("2025-03-14 08:15:02"), Some(at(8, 15, 2)));
        assert_eq!(parse_timestamp("14/03/2025"), None);
    }

    #[test]
    fn test_offset_timestamp_normalized() {
        assert_eq!(
            parse_timestamp("2025-03-14T15:15:02+07:00"),
            Some(at(8, 15, 2))
        );
    }

    #[test]
    fn test_next_timestamp_never_goes_backwards() {
        let clock = ScriptedClock::fixed(at(9, 0, 0));
        assert_eq!(next_timestamp(&clock, None), at(9, 0, 0));
        assert_eq!(next_timestamp(&clock, Some(at(10, 0, 0))), at(10, 0, 0));
        assert_eq!(next_timestamp(&clock, Some(at(8, 0, 0))), at(9, 0, 0));
    }

    #[test]
    fn test_normalize_filter() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("   ")), None);
        assert_eq!(normalize_filter(Some(" PLas ")), Some("plas".to_string()));
    }

    #[test]
    fn test_category_stats() {
        let record = |id, category| ScanRecord {
            id: RecordId::new(id),
            category,
            created_at: at(9, 0, 0),
            source: None,
        };
        let records = vec![
            record(1, Category::Paper),
            record(2, Category::Plastic),
            record(3, Category::Plastic),
        ];

        let stats = CategoryStats::from_records(&records);
        assert_eq!(stats.count(Category::Plastic), 2);
        assert_eq!(stats.count(Category::Organic), 0);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn test_newest_first_breaks_ties_by_id() {
        let a = ScanRecord {
            id: RecordId::new(1),
            category: Category::Paper,
            created_at: at(9, 0, 0),
            source: None,
        };
        let b = ScanRecord {
            id: RecordId::new(2),
            ..a.clone()
        };
        assert_eq!(ScanRecord::newest_first(&a, &b), Ordering::Greater);
        assert_eq!(ScanRecord::newest_first(&b, &a), Ordering::Less);
    }
}
