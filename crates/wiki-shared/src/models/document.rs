use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diff::RevisionDiff;

/// Title given to documents created from the dashboard
pub const DEFAULT_TITLE: &str = "New Document";

/// Content given to documents created from the dashboard
pub const DEFAULT_CONTENT: &str = "# New Document\n\nStart writing...";

/// Canonical document shape.
///
/// Values of this type are only produced by [`crate::wire::WireDocument::normalize`];
/// the serialized form is itself a valid wire payload, so decoding and
/// normalizing it again yields the same document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Set at creation, never changes
    pub owner_email: String,
    pub owner_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub editors: Vec<String>,
    pub viewers: Vec<String>,
    /// Listing payloads omit `revisions` and only report how many there are
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_count: Option<usize>,
    /// Oldest first; the last entry is the current saved state
    pub revisions: Vec<Revision>,
}

impl Document {
    /// The revision representing the current saved state
    pub fn current_revision(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Revisions newest first, the order the history panel lists them in
    pub fn history(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.iter().rev()
    }

    pub fn revision(&self, revision_id: &str) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.id == revision_id)
    }

    pub fn is_current_revision(&self, revision_id: &str) -> bool {
        self.current_revision()
            .is_some_and(|r| r.id == revision_id)
    }

    /// Number of revisions, whether or not the full history was loaded
    pub fn revision_total(&self) -> usize {
        if self.revisions.is_empty() {
            self.revision_count.unwrap_or(0)
        } else {
            self.revisions.len()
        }
    }

    /// Whether `self.revisions` keeps every revision of `earlier` in place,
    /// in order, with any new revisions only after them.
    pub fn extends_history_of(&self, earlier: &Document) -> bool {
        earlier.revisions.len() <= self.revisions.len()
            && earlier
                .revisions
                .iter()
                .zip(&self.revisions)
                .all(|(old, new)| old.id == new.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    #[serde(rename = "_id")]
    pub id: String,
    /// Change summary or snapshot label, e.g. "Document created", "+2, ~1"
    pub changes: String,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<RevisionDiff>,
    /// Set when this revision was produced by restoring an older one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision(id: &str) -> Revision {
        Revision {
            id: id.to_string(),
            changes: "Minor edits".to_string(),
            author_name: "Ada".to_string(),
            author_email: None,
            created_at: None,
            title: None,
            content: None,
            diff: None,
            restored_from: None,
        }
    }

    fn document(revisions: &[&str]) -> Document {
        Document {
            id: "1".to_string(),
            title: "Runbook".to_string(),
            content: String::new(),
            owner_id: None,
            owner_email: "ada@example.com".to_string(),
            owner_name: "Ada".to_string(),
            last_edited_by: None,
            is_public: true,
            created_at: None,
            updated_at: None,
            editors: Vec::new(),
            viewers: Vec::new(),
            revision_count: None,
            revisions: revisions.iter().map(|id| revision(id)).collect(),
        }
    }

    #[test]
    fn history_is_newest_first() {
        let doc = document(&["1", "2", "3"]);
        let ids: Vec<_> = doc.history().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["3", "2", "1"]);
        assert!(doc.is_current_revision("3"));
        assert!(!doc.is_current_revision("1"));
    }

    #[test]
    fn appended_history_extends_earlier_one() {
        let before = document(&["1", "2"]);
        assert!(document(&["1", "2", "3"]).extends_history_of(&before));
        assert!(document(&["1", "2"]).extends_history_of(&before));
        assert!(!document(&["2", "1", "3"]).extends_history_of(&before));
        assert!(!document(&["1"]).extends_history_of(&before));
    }

    #[test]
    fn revision_total_falls_back_to_listing_count() {
        let mut doc = document(&[]);
        doc.revision_count = Some(4);
        assert_eq!(doc.revision_total(), 4);
        assert_eq!(document(&["1", "2"]).revision_total(), 2);
    }
}
