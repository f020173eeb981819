use crate::constants::store::DEFAULT_COLLECTION;
use crate::constants::view::RECENT_DEFAULT_LIMIT;
use crate::search::SearchPolicy;
use crate::submit::TeamPolicy;
use crate::types::CollectionName;

/// Deployment-level settings for a lookup session.
///
/// The search and team policies vary between deployments of the tool; pick
/// one per deployment rather than mixing them at runtime.
#[derive(Clone, Debug)]
pub struct LookupConfig {
    /// Store collection the session mirrors and writes to.
    pub collection: CollectionName,
    /// Match predicate and empty-query behavior for searches.
    pub search: SearchPolicy,
    /// Whether submissions must carry a team.
    pub team: TeamPolicy,
    /// Number of entries surfaced in the recently-added view.
    pub recent_limit: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            search: SearchPolicy::default(),
            team: TeamPolicy::default(),
            recent_limit: RECENT_DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{EmptyQueryPolicy, MatchMode};

    #[test]
    fn defaults_match_the_reference_deployment() {
        let config = LookupConfig::default();
        assert_eq!(config.collection, "acronyms");
        assert_eq!(config.search.mode, MatchMode::KeyOrDefinition);
        assert_eq!(config.search.empty_query, EmptyQueryPolicy::FullSet);
        assert_eq!(config.team, TeamPolicy::Optional);
        assert_eq!(config.recent_limit, 3);
    }
}
