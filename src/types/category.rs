//! Waste categories.
//!
//! `Category` is a closed enumeration. Every value that reaches the ledger
//! passes through [`Category::from_str`], so an unknown name can never be
//! persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A waste category recognised by the classifier and the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Paper,
    Plastic,
    Organic,
}

impl Category {
    /// Every known category, in display order.
    pub const ALL: [Category; 3] = [Self::Paper, Self::Plastic, Self::Organic];

    /// Canonical name as stored in the ledger.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paper => "Paper",
            Self::Plastic => "Plastic",
            Self::Organic => "Organic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CategoryError::Unknown(s.to_string()))
    }
}

impl TryFrom<&str> for Category {
    type Error = CategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error type for category validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    #[error("unknown waste category '{0}' (expected Paper, Plastic or Organic)")]
    Unknown(String),
}
