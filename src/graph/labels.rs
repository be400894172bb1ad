//! Collapsing same-endpoint links into one multi-label edge and back.

use itertools::Itertools;

pub const LABEL_SEPARATOR: &str = " / ";

pub fn join_labels(labels: &[String]) -> String {
    labels.iter().join(LABEL_SEPARATOR)
}

/// Appends every label of `incoming` not yet present in `existing`, keeping first-seen order.
/// Returns whether anything was added.
pub fn merge_labels(existing: &mut Vec<String>, incoming: &[String]) -> bool {
    let before = existing.len();
    for label in incoming {
        if !existing.contains(label) {
            existing.push(label.clone());
        }
    }
    existing.len() != before
}

/// Labels with duplicates removed, first occurrence wins.
pub fn dedup_labels(labels: &[String]) -> Vec<String> {
    labels.iter().unique().cloned().collect()
}

/// Expands one multi-label edge into `(from, to, label)` records, one per label in order.
pub fn expand<T: Copy>(from: T, to: T, labels: &[String]) -> impl Iterator<Item = (T, T, &str)> {
    labels.iter().map(move |label| (from, to, label.as_str()))
}
