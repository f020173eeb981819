//! Entry validation, normalization, and store submission.

use tracing::warn;

use crate::data::EntryFields;
use crate::errors::LookupError;
use crate::store::RecordStore;
use crate::types::{AcronymKey, DefinitionText, TeamName};
use crate::utils::{normalize_acronym, normalized_field, normalized_optional};

/// Whether submissions must name an owning team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TeamPolicy {
    /// Team is optional; teamless records fall into the `Unknown` bucket.
    #[default]
    Optional,
    /// Team is required; blank teams fail validation.
    Required,
}

/// Raw user-entered form fields, exactly as typed.
#[derive(Clone, Debug, Default)]
pub struct EntryForm {
    /// Raw acronym input (any case, untrimmed).
    pub acronym: String,
    /// Raw definition input.
    pub definition: String,
    /// Raw team input; `None` and blank are equivalent.
    pub team: Option<String>,
}

/// Normalized entry accepted by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedEntry {
    /// Canonical store key (trimmed, uppercased).
    pub key: AcronymKey,
    /// Stored definition (trimmed, case preserved).
    pub definition: DefinitionText,
    /// Stored team, when provided.
    pub team: Option<TeamName>,
}

/// Validate and normalize `form` without touching any store.
pub fn prepare_entry(form: &EntryForm, policy: TeamPolicy) -> Result<SubmittedEntry, LookupError> {
    let key = normalize_acronym(&form.acronym);
    if key.is_empty() {
        return Err(blank("acronym"));
    }
    let definition = normalized_field(&form.definition).ok_or_else(|| blank("definition"))?;
    let team = normalized_optional(form.team.as_deref());
    if policy == TeamPolicy::Required && team.is_none() {
        return Err(blank("team"));
    }
    Ok(SubmittedEntry {
        key,
        definition,
        team,
    })
}

/// Validate, normalize, and upsert one entry.
///
/// The store assigns `created_at` on the write, so re-adding an existing
/// acronym refreshes its recency. Mirrors catch up through the subscription
/// channel, never from this call's return value. Store failures are logged
/// and surfaced without retry.
pub fn submit_entry(
    store: &dyn RecordStore,
    collection: &str,
    form: &EntryForm,
    policy: TeamPolicy,
) -> Result<SubmittedEntry, LookupError> {
    let entry = prepare_entry(form, policy)?;
    let fields = EntryFields {
        definition: entry.definition.clone(),
        team: entry.team.clone(),
    };
    if let Err(err) = store.upsert(collection, &entry.key, fields) {
        warn!(collection, key = %entry.key, error = %err, "entry submission failed");
        return Err(err);
    }
    Ok(entry)
}

fn blank(field: &str) -> LookupError {
    LookupError::Validation {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;

    fn form(acronym: &str, definition: &str, team: Option<&str>) -> EntryForm {
        EntryForm {
            acronym: acronym.to_string(),
            definition: definition.to_string(),
            team: team.map(|value| value.to_string()),
        }
    }

    #[test]
    fn prepare_normalizes_key_and_trims_fields() {
        let entry = prepare_entry(
            &form("  api ", "  Application Programming Interface  ", Some(" Platform ")),
            TeamPolicy::Optional,
        )
        .unwrap();
        assert_eq!(entry.key, "API");
        assert_eq!(entry.definition, "Application Programming Interface");
        assert_eq!(entry.team.as_deref(), Some("Platform"));
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        let err = prepare_entry(&form("   ", "definition", None), TeamPolicy::Optional).unwrap_err();
        assert!(matches!(err, LookupError::Validation { ref field } if field == "acronym"));

        let err = prepare_entry(&form("api", " \t", None), TeamPolicy::Optional).unwrap_err();
        assert!(matches!(err, LookupError::Validation { ref field } if field == "definition"));
    }

    #[test]
    fn team_policy_controls_whether_team_is_required() {
        let optional = prepare_entry(&form("api", "definition", None), TeamPolicy::Optional).unwrap();
        assert_eq!(optional.team, None);

        let err = prepare_entry(&form("api", "definition", Some("  ")), TeamPolicy::Required)
            .unwrap_err();
        assert!(matches!(err, LookupError::Validation { ref field } if field == "team"));

        let required =
            prepare_entry(&form("api", "definition", Some("Platform")), TeamPolicy::Required)
                .unwrap();
        assert_eq!(required.team.as_deref(), Some("Platform"));
    }

    #[test]
    fn validation_failures_never_reach_the_store() {
        let store = MemoryRecordStore::new();
        let err = submit_entry(
            &store,
            "acronyms",
            &form("", "something", None),
            TeamPolicy::Optional,
        )
        .unwrap_err();
        assert!(matches!(err, LookupError::Validation { .. }));
        assert!(store.read_all("acronyms").unwrap().is_empty());
    }

    #[test]
    fn successful_submission_upserts_the_normalized_entry() {
        let store = MemoryRecordStore::new();
        let entry = submit_entry(
            &store,
            "acronyms",
            &form("api", "Application Programming Interface", None),
            TeamPolicy::Optional,
        )
        .unwrap();
        assert_eq!(entry.key, "API");

        let records = store.read_all("acronyms").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "API");
        assert_eq!(records[0].definition, "Application Programming Interface");
        assert!(records[0].created_at.is_some());
    }
}
