use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a cached deal entry came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DealSource {
    /// Live result from the text-search provider.
    SearchProvider,
    /// Synthesized because the provider returned no hits for the chain.
    Fallback,
    /// Synthesized because the provider call failed for the chain.
    FallbackError,
    /// Synthesized because the provider was unreachable entirely.
    FallbackCritical,
}

impl std::fmt::Display for DealSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SearchProvider => write!(f, "search-provider"),
            Self::Fallback => write!(f, "fallback"),
            Self::FallbackError => write!(f, "fallback-error"),
            Self::FallbackCritical => write!(f, "fallback-critical"),
        }
    }
}

impl std::str::FromStr for DealSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "search-provider" => Ok(Self::SearchProvider),
            "fallback" => Ok(Self::Fallback),
            "fallback-error" => Ok(Self::FallbackError),
            "fallback-critical" => Ok(Self::FallbackCritical),
            _ => Err(format!("Unknown deal source: {s}")),
        }
    }
}

impl DealSource {
    /// True for entries synthesized locally rather than fetched.
    pub fn is_fallback(self) -> bool {
        !matches!(self, Self::SearchProvider)
    }
}

/// A cached promotional listing for one restaurant chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealEntry {
    pub chain_name: String,
    pub title: String,
    pub link: String,
    pub source: DealSource,
    pub fetched_date: NaiveDate,
}
