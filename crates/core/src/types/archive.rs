//! Soft-delete (archival) state for records.
//!
//! A record is either active or archived. Archiving stamps when and by whom;
//! unarchiving clears both. Permanent deletion is only reachable from the
//! archived state.
//!
//! ```text
//!            archive                  hard delete
//!   Active ───────────▶ Archived ─────────────────▶ (removed)
//!     ▲                    │
//!     └────── unarchive ───┘
//! ```
//!
//! Documents keep the flat `isArchived` / `archivedAt` / `archivedBy` fields;
//! [`ArchiveState`] (de)serializes through [`ArchiveFields`] so the three
//! can never disagree once loaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Archival state of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ArchiveFields", into = "ArchiveFields")]
pub enum ArchiveState {
    /// Visible in the default list.
    #[default]
    Active,
    /// Hidden from the default list, restorable.
    ///
    /// Both stamps are always set by [`ArchiveState::archive`]; records
    /// archived by older tooling may lack them.
    Archived {
        /// When the record was archived.
        at: Option<DateTime<Utc>>,
        /// Display name of the user who archived it.
        by: Option<String>,
    },
}

/// Outcome of applying a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveTransition {
    /// The state changed and must be written back.
    Changed,
    /// The record was already in the target state.
    Unchanged,
}

impl ArchiveTransition {
    /// Whether a write is needed.
    #[must_use]
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

impl ArchiveState {
    /// Whether the record is archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        matches!(self, Self::Archived { .. })
    }

    /// Permanent deletion is only allowed for archived records.
    #[must_use]
    pub const fn allows_hard_delete(&self) -> bool {
        self.is_archived()
    }

    /// Archive the record. Archiving an archived record keeps the original
    /// stamps.
    pub fn archive(&mut self, by: impl Into<String>, at: DateTime<Utc>) -> ArchiveTransition {
        match self {
            Self::Archived { .. } => ArchiveTransition::Unchanged,
            Self::Active => {
                *self = Self::Archived {
                    at: Some(at),
                    by: Some(by.into()),
                };
                ArchiveTransition::Changed
            }
        }
    }

    /// Restore the record to the active list.
    pub fn unarchive(&mut self) -> ArchiveTransition {
        match self {
            Self::Active => ArchiveTransition::Unchanged,
            Self::Archived { .. } => {
                *self = Self::Active;
                ArchiveTransition::Changed
            }
        }
    }

    /// When the record was archived, if known.
    #[must_use]
    pub const fn archived_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Archived { at, .. } => *at,
            Self::Active => None,
        }
    }

    /// Who archived the record, if known.
    #[must_use]
    pub fn archived_by(&self) -> Option<&str> {
        match self {
            Self::Archived { by, .. } => by.as_deref(),
            Self::Active => None,
        }
    }
}

/// Flat document representation of [`ArchiveState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveFields {
    /// `true` when archived.
    #[serde(default)]
    pub is_archived: bool,
    /// Archive timestamp, `null` when active.
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    /// Archiving user, `null` when active.
    #[serde(default)]
    pub archived_by: Option<String>,
}

impl From<ArchiveFields> for ArchiveState {
    fn from(fields: ArchiveFields) -> Self {
        if fields.is_archived {
            Self::Archived {
                at: fields.archived_at,
                by: fields.archived_by,
            }
        } else {
            Self::Active
        }
    }
}

impl From<ArchiveState> for ArchiveFields {
    fn from(state: ArchiveState) -> Self {
        match state {
            ArchiveState::Active => Self::default(),
            ArchiveState::Archived { at, by } => Self {
                is_archived: true,
                archived_at: at,
                archived_by: by,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_archive_sets_stamps() {
        let mut state = ArchiveState::Active;
        assert_eq!(state.archive("Maria", ts(100)), ArchiveTransition::Changed);
        assert!(state.is_archived());
        assert_eq!(state.archived_at(), Some(ts(100)));
        assert_eq!(state.archived_by(), Some("Maria"));
    }

    #[test]
    fn test_archive_is_idempotent() {
        let mut state = ArchiveState::Active;
        state.archive("Maria", ts(100));
        let before = state.clone();

        assert_eq!(state.archive("Pedro", ts(200)), ArchiveTransition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn test_unarchive_clears_stamps() {
        let mut state = ArchiveState::Active;
        state.archive("Maria", ts(100));
        assert_eq!(state.unarchive(), ArchiveTransition::Changed);
        assert_eq!(state, ArchiveState::Active);
        assert_eq!(state.archived_by(), None);
        assert_eq!(state.unarchive(), ArchiveTransition::Unchanged);
    }

    #[test]
    fn test_hard_delete_only_when_archived() {
        let mut state = ArchiveState::Active;
        assert!(!state.allows_hard_delete());
        state.archive("Maria", ts(1));
        assert!(state.allows_hard_delete());
        state.unarchive();
        assert!(!state.allows_hard_delete());
    }

    #[test]
    fn test_flat_fields_serialization() {
        let mut state = ArchiveState::Active;
        state.archive("Maria", ts(0));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["isArchived"], true);
        assert_eq!(json["archivedBy"], "Maria");
        assert_eq!(json["archivedAt"], "1970-01-01T00:00:00Z");

        let active = serde_json::to_value(ArchiveState::Active).unwrap();
        assert_eq!(active["isArchived"], false);
        assert!(active["archivedAt"].is_null());
    }

    #[test]
    fn test_missing_fields_deserialize_as_active() {
        let state: ArchiveState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, ArchiveState::Active);

        let legacy: ArchiveState = serde_json::from_str(r#"{"isArchived": true}"#).unwrap();
        assert!(legacy.is_archived());
        assert_eq!(legacy.archived_at(), None);
    }
}
