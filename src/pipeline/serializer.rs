//! Document serialization.
//!
//! Renders the final ordered sequence back to extended-M3U text. Rewrites
//! happen on the raw directive's attribute block (everything before the last
//! comma): the channel number is always written, group labels only under the
//! label-rewrite policy. A directive without a comma is emitted verbatim
//! with its stream line; nothing is rewritten for it even though a channel
//! number was computed for the entry.

use regex::{NoExpand, Regex};
use std::sync::OnceLock;

use crate::models::{CategoryTable, MergePolicy, PlaylistEntry};
use crate::pipeline::parser::FORMAT_HEADER;

fn tvg_chno_replace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)tvg-chno=(?:"[^"]*"|\S+)"#).expect("tvg-chno pattern must compile")
    })
}

fn group_title_replace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)group-title=(?:"[^"]*"|[^\s,]+)"#)
            .expect("group-title pattern must compile")
    })
}

/// Substitute the first occurrence of an attribute, or append it when the
/// pattern finds nothing.
fn replace_or_append(attributes: &str, pattern: &Regex, key: &str, value: &str) -> String {
    let rendered = format!(r#"{key}="{value}""#);
    if pattern.is_match(attributes) {
        pattern
            .replace(attributes, NoExpand(rendered.as_str()))
            .into_owned()
    } else {
        format!("{attributes} {rendered}")
    }
}

/// Render the document: header line, then one directive/stream pair per
/// entry, newline-joined with a single trailing newline.
///
/// `numbers` is the parallel assignment produced by
/// [`crate::pipeline::numbering::assign_channel_numbers`] for this exact
/// sequence.
pub fn serialize_document(
    entries: &[PlaylistEntry],
    numbers: &[u32],
    policy: &MergePolicy,
    categories: &CategoryTable,
) -> String {
    debug_assert_eq!(entries.len(), numbers.len());

    let mut lines = Vec::with_capacity(entries.len() * 2 + 1);
    lines.push(FORMAT_HEADER.to_string());

    for (entry, number) in entries.iter().zip(numbers) {
        let Some(comma_idx) = entry.raw_directive.rfind(',') else {
            // Pass-through edge case: no attribute/name split point exists,
            // so the directive is not rewritten at all.
            lines.push(entry.raw_directive.clone());
            lines.push(entry.stream_url.clone());
            continue;
        };

        let (attribute_block, name_block) = entry.raw_directive.split_at(comma_idx);
        let mut attributes = attribute_block.to_string();

        if policy.rewrite_labels {
            let label = if entry.is_designated {
                categories.designated_label.clone()
            } else {
                categories.category_for(entry.group_title.as_deref())
            };
            attributes = replace_or_append(
                &attributes,
                group_title_replace_pattern(),
                "group-title",
                &label,
            );
        }

        attributes = replace_or_append(
            &attributes,
            tvg_chno_replace_pattern(),
            "tvg-chno",
            &number.to_string(),
        );

        lines.push(format!("{attributes}{name_block}"));
        lines.push(entry.stream_url.clone());
    }

    lines.join("\n") + "\n"
}
