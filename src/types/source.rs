//! Provenance of a classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a category came from.
///
/// Classification results are either `Remote` or `Fallback`; `Manual`
/// marks categories the user recorded directly without classifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Remote,
    Fallback,
    Manual,
}

impl Source {
    /// Name stored in the ledger's `source` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "fallback" | "mock" => Ok(Self::Fallback),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("unknown source: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_str() {
        assert_eq!("remote".parse::<Source>().unwrap(), Source::Remote);
        assert_eq!("Fallback".parse::<Source>().unwrap(), Source::Fallback);
        assert_eq!("manual".parse::<Source>().unwrap(), Source::Manual);
        assert!("cloud".parse::<Source>().is_err());
    }
}
