//! Tag-filtered listing
//!
//! Filtering is union-match: a record qualifies when its tag set overlaps
//! the requested tags at all. An empty request matches everything, so an
//! unfiltered listing is always a superset of any filtered one.

use std::collections::BTreeSet;

use super::FileRecord;

/// Normalize raw tag strings into the canonical stored form: trimmed,
/// lowercased, empties dropped, duplicates collapsed.
pub fn normalize_tags<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Keep the records whose tag set intersects `tags`. Requested tags are
/// assumed already normalized via [`normalize_tags`].
pub fn filter_by_tags(records: Vec<FileRecord>, tags: &BTreeSet<String>) -> Vec<FileRecord> {
    if tags.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.tags.intersection(tags).next().is_some())
        .collect()
}
