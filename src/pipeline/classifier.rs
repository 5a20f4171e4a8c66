//! Designated-group classification.
//!
//! Two mutually exclusive modes, picked by the policy rather than per entry:
//! with a designated source configured, membership is purely "came from that
//! source"; without one, membership is inferred from script content in the
//! display name. Classification never touches group labels — label rewriting
//! belongs to the serializer, so dedup and numbering always observe original
//! labels.
//!
//! All functions here are pure over their inputs and never panic.

use tracing::warn;

use crate::models::{MergePolicy, PlaylistEntry};

/// True when the text contains at least one CJK Unified Ideograph
/// (U+4E00..=U+9FA5).
pub fn contains_cjk_ideograph(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

/// Set `is_designated` on every entry according to the active policy.
pub fn classify_entries(entries: &mut [PlaylistEntry], policy: &MergePolicy) {
    match policy.designated_locator() {
        Some(designated) => {
            for entry in entries.iter_mut() {
                entry.is_designated = entry.origin_source == designated;
            }
        }
        None => {
            for entry in entries.iter_mut() {
                entry.is_designated = contains_cjk_ideograph(&entry.display_name);
            }
        }
    }
}

/// Reduce the sequence to the designated group for a designated-only output.
///
/// With a designated source configured and at least one entry actually
/// originating from it, only that source's entries survive. When the
/// configured source contributed nothing, the filter falls back to script
/// detection: entries are reclassified by content so the surviving set, the
/// report counts and the designation flags all agree.
pub fn apply_designated_filter(
    mut entries: Vec<PlaylistEntry>,
    policy: &MergePolicy,
) -> Vec<PlaylistEntry> {
    if let Some(designated) = policy.designated_locator() {
        let has_designated_entries = entries.iter().any(|e| e.origin_source == designated);
        if !has_designated_entries {
            warn!(
                "No entries from designated source {}; falling back to script detection",
                designated
            );
            for entry in entries.iter_mut() {
                entry.is_designated = contains_cjk_ideograph(&entry.display_name);
            }
        }
    }
    entries.retain(|e| e.is_designated);
    entries
}
