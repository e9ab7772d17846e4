//! Store-assigned surrogate keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted scan record.
///
/// Only the store constructs these; ids are assigned at insertion time,
/// increase monotonically and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub(crate) const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw key.
    #[inline]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}
