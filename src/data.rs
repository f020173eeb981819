use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::types::{AcronymKey, DefinitionText, TeamName};

/// Canonical acronym record as mirrored from a record store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcronymRecord {
    /// Uppercased acronym key; unique document id within a collection.
    pub key: AcronymKey,
    /// Expanded definition text.
    pub definition: DefinitionText,
    /// Owning team, when attributed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamName>,
    /// Store-assigned write timestamp; reassigned on every overwrite.
    /// `None` for records predating timestamp assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AcronymRecord {
    /// Build a record with no team and no timestamp.
    pub fn new(key: impl Into<AcronymKey>, definition: impl Into<DefinitionText>) -> Self {
        Self {
            key: key.into(),
            definition: definition.into(),
            team: None,
            created_at: None,
        }
    }

    /// Attach a team label.
    pub fn with_team(mut self, team: impl Into<TeamName>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Attach a creation timestamp.
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Field payload for an upsert; the store assigns `created_at` itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFields {
    /// Expanded definition text (trimmed, case preserved).
    pub definition: DefinitionText,
    /// Optional owning team (trimmed, case preserved).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamName>,
}
