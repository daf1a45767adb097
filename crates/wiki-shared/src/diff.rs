use serde::{Deserialize, Serialize};

/// Position-wise line statistics between two versions of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionDiff {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub total_lines: usize,
}

impl RevisionDiff {
    /// Compare line `i` of `old` with line `i` of `new` for every index up to
    /// the longer of the two. No alignment is attempted, so an inserted line
    /// shows up as modifications of everything after it.
    pub fn between(old: &str, new: &str) -> Self {
        let old_lines: Vec<&str> = old.split('\n').collect();
        let new_lines: Vec<&str> = new.split('\n').collect();

        let mut diff = Self {
            total_lines: new_lines.len(),
            ..Self::default()
        };

        for i in 0..old_lines.len().max(new_lines.len()) {
            match (old_lines.get(i), new_lines.get(i)) {
                (None, Some(_)) => diff.added += 1,
                (Some(_), None) => diff.removed += 1,
                (Some(a), Some(b)) if a != b => diff.modified += 1,
                _ => {}
            }
        }

        diff
    }
}

/// Summary line written into a new revision, e.g. `Title changed, +2, ~1`.
pub fn change_summary(title_changed: bool, diff: &RevisionDiff) -> String {
    let mut parts = Vec::new();
    if title_changed {
        parts.push("Title changed".to_string());
    }
    if diff.added > 0 {
        parts.push(format!("+{}", diff.added));
    }
    if diff.removed > 0 {
        parts.push(format!("-{}", diff.removed));
    }
    if diff.modified > 0 {
        parts.push(format!("~{}", diff.modified));
    }

    if parts.is_empty() {
        "Minor edits".to_string()
    } else {
        parts.join(", ")
    }
}
