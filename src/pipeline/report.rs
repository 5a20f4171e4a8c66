//! Operator-facing diagnostics report.
//!
//! A plain-text dump of the final entry sequence: totals, per-source and
//! per-group breakdowns, and the channel numbers the real document would
//! carry. The report recomputes numbers through the same assigner the
//! serializer uses, so the two views can never drift apart. Building a
//! report has no effect on any document output.

use std::collections::BTreeMap;

use crate::models::{CategoryTable, MergePolicy, PlaylistEntry};
use crate::pipeline::classifier::contains_cjk_ideograph;
use crate::pipeline::numbering::assign_channel_numbers;

/// Channels listed per source before the "and N more" cut.
const SOURCE_SAMPLE_LIMIT: usize = 5;

/// Label a group is reported under.
///
/// Mirrors what the serializer would emit: the normalized label under the
/// rewrite policy, the original one otherwise.
fn report_group(entry: &PlaylistEntry, policy: &MergePolicy, categories: &CategoryTable) -> String {
    if policy.rewrite_labels {
        if entry.is_designated {
            categories.designated_label.clone()
        } else {
            categories.category_for(entry.group_title.as_deref())
        }
    } else {
        match entry.group_title.as_deref() {
            Some(label) => label.to_string(),
            None => "(none)".to_string(),
        }
    }
}

/// Render the diagnostics report for the final, already sorted sequence.
pub fn build_report(
    entries: &[PlaylistEntry],
    policy: &MergePolicy,
    categories: &CategoryTable,
    designated_only: bool,
) -> String {
    let numbers = assign_channel_numbers(entries);

    let mut by_source: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut by_group: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        by_source
            .entry(entry.origin_source.as_str())
            .or_default()
            .push(idx);
        by_group
            .entry(report_group(entry, policy, categories))
            .or_default()
            .push(idx);
    }

    let designated_count = entries.iter().filter(|e| e.is_designated).count();
    let kept = entries
        .iter()
        .zip(&numbers)
        .filter(|(e, n)| e.valid_channel_number() == Some(**n))
        .count();
    let fresh = entries.len() - kept;

    let mut lines = vec![
        format!("Total channels: {}", entries.len()),
        format!("Total groups: {}", by_group.len()),
        format!("Total sources: {}", by_source.len()),
        format!(
            "Designated source: {}",
            policy.designated_locator().unwrap_or("not set")
        ),
        format!("Designated-only mode: {designated_only}"),
        format!("Designated channels: {designated_count}"),
    ];
    match (numbers.iter().min(), numbers.iter().max()) {
        (Some(min), Some(max)) => lines.push(format!(
            "Channel numbers: min={min} max={max} ({kept} kept, {fresh} fresh)"
        )),
        _ => lines.push("Channel numbers: none".to_string()),
    }

    lines.push(String::new());
    lines.push("Source list:".to_string());
    for (source, indices) in &by_source {
        let designated_here = indices
            .iter()
            .filter(|&&i| entries[i].is_designated)
            .count();
        let marker = if Some(*source) == policy.designated_locator() {
            " (DESIGNATED)"
        } else {
            ""
        };
        lines.push(String::new());
        lines.push(format!(
            "Source: {}{} ({} channels, {} designated)",
            source,
            marker,
            indices.len(),
            designated_here
        ));
        for &i in indices.iter().take(SOURCE_SAMPLE_LIMIT) {
            let entry = &entries[i];
            let designated_flag = if entry.is_designated {
                " [DESIGNATED]"
            } else {
                ""
            };
            let cjk_flag = if contains_cjk_ideograph(&entry.display_name) {
                " [CJK]"
            } else {
                ""
            };
            lines.push(format!("  {}{designated_flag}{cjk_flag}", entry.display_name));
        }
        if indices.len() > SOURCE_SAMPLE_LIMIT {
            lines.push(format!(
                "  ... and {} more channels",
                indices.len() - SOURCE_SAMPLE_LIMIT
            ));
        }
    }

    lines.push(String::new());
    lines.push("Group channel list:".to_string());
    for (group, indices) in &by_group {
        lines.push(String::new());
        lines.push(format!("Group: {} ({} channels)", group, indices.len()));
        let mut ordered: Vec<usize> = indices.clone();
        ordered.sort_by_key(|&i| numbers[i]);
        for i in ordered {
            let entry = &entries[i];
            let designated_flag = if entry.is_designated {
                " [DESIGNATED]"
            } else {
                ""
            };
            lines.push(format!(
                "  {}: {} [{}] (Source: {}) (Original channel number: {}){}",
                numbers[i],
                entry.display_name,
                entry.tvg_id.as_deref().unwrap_or("NO-ID"),
                entry.origin_source,
                entry.tvg_chno.as_deref().unwrap_or("EMPTY"),
                designated_flag
            ));
        }
    }

    lines.join("\n")
}
