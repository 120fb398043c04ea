//! The record types that flow between the cache, the remote store, and the engine.
//! Serialized field names stay camelCase so stored blobs and remote documents keep
//! the shape the presentation layer already understands.

use chrono::{DateTime, Utc};

/// One tardiness event for one student on one day.
///
/// `grade`/`strand`/`section` are literal copies of the option values that were
/// selected at entry time, not references into the option set. Deleting an option
/// later leaves these values orphaned, which is tolerated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TardinessRecord {
    /// Opaque, generated client-side at creation time, immutable. Identity of the
    /// record in both the cache and the remote store.
    pub id: String,
    pub full_name: String,
    pub grade: u8,
    pub strand: String,
    pub section: String,
    /// Instant of creation, overwritten by a later edit.
    pub timestamp: DateTime<Utc>,
}

/// A candidate record as submitted by the presentation layer: no id, no timestamp.
/// The engine assigns both.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub full_name: String,
    pub grade: u8,
    pub strand: String,
    pub section: String,
}

impl NewEntry {
    /// True when `record` is the same student in the same slot, by the duplicate-check
    /// rule: case-insensitive name, exact grade/strand/section.
    pub(crate) fn matches(&self, record: &TardinessRecord) -> bool {
        record.full_name.to_lowercase() == self.full_name.to_lowercase()
            && record.grade == self.grade
            && record.strand == self.strand
            && record.section == self.section
    }
}

/// A selectable grade/strand/section combination. Identity is the whole triple;
/// there is no separate id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStrandSection {
    pub grade: u8,
    pub strand: String,
    pub section: String,
}

impl GradeStrandSection {
    /// The synthetic document key used in the remote store, e.g. `"11-STEM-A"`.
    pub fn doc_id(&self) -> String {
        format!("{}-{}-{}", self.grade, self.strand, self.section)
    }
}

/// A queued change that has not yet been confirmed applied to the remote store.
///
/// Appended when a mutating operation happens while offline (or its live remote
/// write fails); the whole batch is removed at once after a successful replay pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PendingMutation {
    CreateEntry { entry: TardinessRecord },
    UpdateEntry { entry: TardinessRecord },
    DeleteEntry { id: String },
    AddOption { option: GradeStrandSection },
    DeleteOption { option: GradeStrandSection },
}

impl PendingMutation {
    /// The record id this mutation settles, if it concerns the tardiness collection.
    pub(crate) fn entry_id(&self) -> Option<&str> {
        match self {
            PendingMutation::CreateEntry { entry } | PendingMutation::UpdateEntry { entry } => {
                Some(&entry.id)
            }
            PendingMutation::DeleteEntry { id } => Some(id),
            PendingMutation::AddOption { .. } | PendingMutation::DeleteOption { .. } => None,
        }
    }
}

/// Where a record stands relative to the remote store. Kept in a status-by-id map
/// inside the engine so replay and merge have a single source of truth instead of
/// inferring it from queue membership.
///
/// A record can bounce between `LocalOnly` and `Synced` indefinitely as
/// connectivity flaps; that regression is expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    LocalOnly,
    Syncing,
    Synced,
}

/// Title-case a student name: trim, lowercase, then uppercase the first letter of
/// each whitespace-separated word.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_title_cases_each_word() {
        assert_eq!(normalize_name("juan dela cruz"), "Juan Dela Cruz");
        assert_eq!(normalize_name("  MARIA   CLARA  "), "Maria Clara");
    }

    #[test]
    fn test_normalize_name_empty() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_option_doc_id() {
        let gss = GradeStrandSection {
            grade: 11,
            strand: "STEM".to_string(),
            section: "A".to_string(),
        };
        assert_eq!(gss.doc_id(), "11-STEM-A");
    }

    #[test]
    fn test_pending_mutation_round_trips_through_json() {
        let mutation = PendingMutation::DeleteEntry {
            id: "abc123".to_string(),
        };
        let json = serde_json::to_string(&mutation).unwrap();
        assert_eq!(
            serde_json::from_str::<PendingMutation>(&json).unwrap(),
            mutation
        );
    }
}
