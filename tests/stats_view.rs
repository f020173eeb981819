use std::sync::Arc;

use chrono::{TimeZone, Utc};

use acronyms::{
    count_by_team, recently_added, team_breakdown, AcronymRecord, LookupConfig, LookupSession,
    MemoryRecordStore, RecordStore,
};

fn dated(key: &str, team: Option<&str>, secs: i64) -> AcronymRecord {
    let mut record = AcronymRecord::new(key, format!("definition of {key}"))
        .with_created_at(Utc.timestamp_opt(secs, 0).unwrap());
    if let Some(team) = team {
        record = record.with_team(team);
    }
    record
}

#[test]
fn counts_bucket_teamless_records_as_unknown() {
    let records = vec![
        AcronymRecord::new("A1", "definition").with_team("A"),
        AcronymRecord::new("A2", "definition").with_team("A"),
        AcronymRecord::new("X1", "definition"),
    ];
    let counts = count_by_team(&records);
    assert_eq!(counts.get("A"), Some(&2));
    assert_eq!(counts.get("Unknown"), Some(&1));
    assert_eq!(counts.len(), 2);
}

#[test]
fn breakdown_shares_sum_to_one_over_a_nonempty_set() {
    let records = vec![
        dated("A1", Some("Platform"), 1),
        dated("A2", Some("Platform"), 2),
        dated("B1", Some("Support"), 3),
        dated("X1", None, 4),
    ];
    let shares = team_breakdown(&records);
    let total: f64 = shares.iter().map(|entry| entry.share).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(shares[0].team, "Platform");
    assert_eq!(shares[0].count, 2);
}

#[test]
fn recently_added_skips_untimestamped_records() {
    let records = vec![
        dated("NEW", None, 300),
        AcronymRecord::new("LEGACY", "predates timestamps"),
        dated("OLD", None, 100),
        dated("MID", None, 200),
    ];
    let recent = recently_added(&records, 3);
    let keys: Vec<&str> = recent.iter().map(|record| record.key.as_str()).collect();
    assert_eq!(keys, vec!["NEW", "MID", "OLD"]);

    assert_eq!(recently_added(&records, 2).len(), 2);
    assert!(recently_added(&[], 3).is_empty());
}

#[test]
fn session_overview_reflects_the_live_mirror() {
    let store = Arc::new(MemoryRecordStore::new());
    store
        .seed(
            "acronyms",
            vec![
                dated("API", Some("Platform"), 100),
                dated("SLA", Some("Support"), 300),
                dated("DNS", None, 200),
                AcronymRecord::new("LEGACY", "predates timestamps"),
            ],
        )
        .unwrap();

    let session =
        LookupSession::attach(Arc::clone(&store) as Arc<dyn RecordStore>, LookupConfig::default())
            .unwrap();
    let overview = session.overview();

    assert_eq!(overview.total, 4);
    let unknown = overview
        .teams
        .iter()
        .find(|entry| entry.team == "Unknown")
        .unwrap();
    assert_eq!(unknown.count, 2);

    let recent_keys: Vec<&str> = overview
        .recent
        .iter()
        .map(|record| record.key.as_str())
        .collect();
    assert_eq!(recent_keys, vec!["SLA", "DNS", "API"]);

    // A new write reshapes the stats on the next read.
    session
        .submit(&acronyms::EntryForm {
            acronym: "cdn".to_string(),
            definition: "Content Delivery Network".to_string(),
            team: Some("Platform".to_string()),
        })
        .unwrap();
    let refreshed = session.overview();
    assert_eq!(refreshed.total, 5);
    assert_eq!(refreshed.recent[0].key, "CDN");
}
