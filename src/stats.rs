use std::collections::HashMap;

use crate::constants::view::UNKNOWN_TEAM;
use crate::data::AcronymRecord;
use crate::types::TeamName;

/// Per-team share of the mirrored set for stats panels.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamShare {
    /// Team label, or the `Unknown` bucket.
    pub team: TeamName,
    /// Records attributed to this team.
    pub count: usize,
    /// Fraction of the total set held by this team.
    pub share: f64,
}

/// Quick-stats payload derived from one mirror snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupOverview {
    /// Total mirrored records.
    pub total: usize,
    /// Per-team counts and shares, largest first.
    pub teams: Vec<TeamShare>,
    /// Most recently added records, newest first.
    pub recent: Vec<AcronymRecord>,
}

/// Count records per team; teamless records land in the `Unknown` bucket.
pub fn count_by_team(records: &[AcronymRecord]) -> HashMap<TeamName, usize> {
    let mut counts = HashMap::new();
    for record in records {
        let team = record.team.as_deref().unwrap_or(UNKNOWN_TEAM);
        *counts.entry(team.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Per-team counts with share-of-total, sorted descending then by name.
pub fn team_breakdown(records: &[AcronymRecord]) -> Vec<TeamShare> {
    let counts = count_by_team(records);
    let total: usize = counts.values().sum();
    let mut shares: Vec<TeamShare> = counts
        .into_iter()
        .map(|(team, count)| TeamShare {
            team,
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.team.cmp(&b.team)));
    shares
}

/// Up to `limit` records ordered newest first.
///
/// Records without a store-assigned timestamp are excluded; ties keep the
/// input (mirror) order.
pub fn recently_added(records: &[AcronymRecord], limit: usize) -> Vec<AcronymRecord> {
    let mut dated: Vec<AcronymRecord> = records
        .iter()
        .filter(|record| record.created_at.is_some())
        .cloned()
        .collect();
    dated.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    dated.truncate(limit);
    dated
}

/// Build the full quick-stats payload for one snapshot.
pub fn overview(records: &[AcronymRecord], recent_limit: usize) -> LookupOverview {
    LookupOverview {
        total: records.len(),
        teams: team_breakdown(records),
        recent: recently_added(records, recent_limit),
    }
}
