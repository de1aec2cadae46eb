//! Per-source and aggregate research results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Item;

/// Caller overrides for a batch research run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Lookback window in days
    pub days_back: u32,
    pub max_papers: usize,
    pub max_repos: usize,
    pub max_products: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            days_back: 7,
            max_papers: 10,
            max_repos: 10,
            max_products: 10,
        }
    }
}

/// Source-local failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingCredential,
    Timeout,
    TransportError,
    MalformedResponse,
    InvalidParameters,
}

/// Why one source produced no items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Source id (e.g. `papers`)
    pub source: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Outcome of one adapter invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult {
    Success { items: Vec<Item> },
    Failure(SourceFailure),
}

impl SourceResult {
    pub fn success(items: Vec<Item>) -> Self {
        SourceResult::Success { items }
    }

    pub fn failure(source: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        SourceResult::Failure(SourceFailure {
            source: source.into(),
            kind,
            reason: reason.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success { .. })
    }

    /// Number of items on success, zero on failure
    pub fn count(&self) -> usize {
        match self {
            SourceResult::Success { items } => items.len(),
            SourceResult::Failure(_) => 0,
        }
    }

    /// Items on success, `None` on failure
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            SourceResult::Success { items } => Some(items),
            SourceResult::Failure(_) => None,
        }
    }

    pub fn failure_ref(&self) -> Option<&SourceFailure> {
        match self {
            SourceResult::Success { .. } => None,
            SourceResult::Failure(failure) => Some(failure),
        }
    }
}

/// Whether every attempted source succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateStatus {
    #[serde(rename = "success")]
    Complete,
    #[serde(rename = "partial")]
    Partial,
}

/// One failed source in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateError {
    pub source: String,
    pub reason: String,
}

/// Merged result of one `fetch_all` run.
///
/// `status` is `Complete` exactly when `errors` is empty, and `sources_fetched`
/// equals the number of entries in `research_data`. Both hold by construction:
/// the only way to add data is [`AggregateResult::record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    status: AggregateStatus,
    #[serde(rename = "research_data")]
    by_source: BTreeMap<String, Vec<Item>>,
    errors: Vec<AggregateError>,
    sources_fetched: usize,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self {
            status: AggregateStatus::Complete,
            by_source: BTreeMap::new(),
            errors: Vec::new(),
            sources_fetched: 0,
        }
    }

    /// Fold one source's result into the batch
    pub fn record(&mut self, source: &str, result: SourceResult) {
        match result {
            SourceResult::Success { items } => {
                if self.by_source.insert(source.to_string(), items).is_none() {
                    self.sources_fetched += 1;
                }
            }
            SourceResult::Failure(failure) => {
                self.errors.push(AggregateError {
                    source: source.to_string(),
                    reason: failure.reason,
                });
                self.status = AggregateStatus::Partial;
            }
        }
    }

    pub fn status(&self) -> AggregateStatus {
        self.status
    }

    pub fn by_source(&self) -> &BTreeMap<String, Vec<Item>> {
        &self.by_source
    }

    /// Items for one source, if it succeeded
    pub fn items(&self, source: &str) -> Option<&[Item]> {
        self.by_source.get(source).map(Vec::as_slice)
    }

    pub fn errors(&self) -> &[AggregateError] {
        &self.errors
    }

    pub fn sources_fetched(&self) -> usize {
        self.sources_fetched
    }
}

impl Default for AggregateResult {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(String, SourceResult)> for AggregateResult {
    fn from_iter<I: IntoIterator<Item = (String, SourceResult)>>(iter: I) -> Self {
        let mut aggregate = AggregateResult::new();
        for (source, result) in iter {
            aggregate.record(&source, result);
        }
        aggregate
    }
}
