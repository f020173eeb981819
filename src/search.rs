//! Pure search filtering over mirror snapshots.
//!
//! Filtering is synchronous and stateless: for a fixed snapshot and query
//! the result is identical on every call, and result order is the order of
//! the input records (no relevance ranking).

use crate::data::AcronymRecord;
use crate::utils::{contains_ignore_case, starts_with_ignore_case};

/// Predicate applied per record when the query is non-empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The key starts with the query.
    KeyPrefix,
    /// The key contains the query.
    KeyContains,
    /// The key or the definition contains the query.
    #[default]
    KeyOrDefinition,
}

/// Behavior when the query is empty after trimming.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyQueryPolicy {
    /// Return the full mirrored set.
    #[default]
    FullSet,
    /// Return nothing until a query is entered.
    NoResults,
}

/// Match predicate plus empty-query behavior for one deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Predicate applied to each record.
    pub mode: MatchMode,
    /// What an empty query returns.
    pub empty_query: EmptyQueryPolicy,
}

/// Filter `records` against `query`, preserving input order.
///
/// The query is trimmed before matching; all matching is case-insensitive.
pub fn filter<'a>(
    records: &'a [AcronymRecord],
    query: &str,
    policy: SearchPolicy,
) -> Vec<&'a AcronymRecord> {
    let query = query.trim();
    if query.is_empty() {
        return match policy.empty_query {
            EmptyQueryPolicy::FullSet => records.iter().collect(),
            EmptyQueryPolicy::NoResults => Vec::new(),
        };
    }
    records
        .iter()
        .filter(|record| matches(record, query, policy.mode))
        .collect()
}

/// True when `record` satisfies `mode` for a non-empty `query`.
pub fn matches(record: &AcronymRecord, query: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::KeyPrefix => starts_with_ignore_case(&record.key, query),
        MatchMode::KeyContains => contains_ignore_case(&record.key, query),
        MatchMode::KeyOrDefinition => {
            contains_ignore_case(&record.key, query)
                || contains_ignore_case(&record.definition, query)
        }
    }
}
