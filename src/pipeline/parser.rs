//! Extended-M3U text parsing.
//!
//! Turns the raw playlist text of one source into structured entries. The
//! format in the wild is loose: attribute order varies, values may be quoted
//! or bare, directives appear without a following stream line. The parser
//! recovers from all of that by dropping what it cannot pair up and
//! defaulting what it cannot read; it never fails a whole source.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::PlaylistEntry;

/// Format header; any line starting with this is skipped.
pub const FORMAT_HEADER: &str = "#EXTM3U";
/// Directive prefix introducing one playlist entry.
pub const DIRECTIVE_PREFIX: &str = "#EXTINF";

fn tvg_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)tvg-id=(?:"([^"]*)"|([^\s,]+))"#).expect("tvg-id pattern must compile")
    })
}

fn group_title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)group-title=(?:"([^"]*)"|([^\s,]+))"#)
            .expect("group-title pattern must compile")
    })
}

fn tvg_chno_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)tvg-chno=(?:"([^"]*)"|([^\s,]+))"#)
            .expect("tvg-chno pattern must compile")
    })
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)#EXTINF:(-?\d+(?:\.\d+)?)").expect("duration pattern must compile")
    })
}

/// Extract one attribute from a directive line.
///
/// Accepts `key="quoted value"` or a bare `key=token` delimited by
/// whitespace/comma, case-insensitive on the key. Present-but-empty values
/// are treated the same as absent ones everywhere downstream, so they
/// collapse to `None` here.
fn attribute_value(directive: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(directive)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Display name is the trailing segment after the last comma; empty if the
/// directive has no comma at all.
fn display_name(directive: &str) -> String {
    match directive.rfind(',') {
        Some(idx) => directive[idx + 1..].trim().to_string(),
        None => String::new(),
    }
}

/// Duration from the directive's leading numeric token, `-1.0` when absent
/// or unparsable.
fn duration_seconds(directive: &str) -> f64 {
    duration_pattern()
        .captures(directive)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(-1.0)
}

/// Parse one source's playlist text into entries.
///
/// A directive line only yields an entry when the immediately following line
/// is present and is not itself a comment/directive; otherwise the directive
/// is discarded. The consumed stream line is never reprocessed as a
/// directive candidate.
pub fn parse_playlist(text: &str, origin_source: &str) -> Vec<PlaylistEntry> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut entries = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() || line.starts_with(FORMAT_HEADER) {
            i += 1;
            continue;
        }
        if line.starts_with(DIRECTIVE_PREFIX) {
            let next = lines.get(i + 1).copied().unwrap_or("");
            if !next.is_empty() && !next.starts_with('#') {
                entries.push(PlaylistEntry {
                    raw_directive: line.to_string(),
                    stream_url: next.to_string(),
                    display_name: display_name(line),
                    tvg_id: attribute_value(line, tvg_id_pattern()),
                    group_title: attribute_value(line, group_title_pattern()),
                    tvg_chno: attribute_value(line, tvg_chno_pattern()),
                    duration_secs: duration_seconds(line),
                    origin_source: origin_source.to_string(),
                    is_designated: false,
                });
                // skip the consumed stream line
                i += 1;
            }
        }
        i += 1;
    }

    debug!(
        "Parsed {} entries from source {}",
        entries.len(),
        origin_source
    );
    entries
}
