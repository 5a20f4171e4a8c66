//! Core data model for the aggregation pipeline
//!
//! Everything here is a plain value type: entries live for exactly one
//! pipeline run, policies are resolved snapshots, and the category table is
//! an immutable lookup injected into the stages that need it.

use serde::{Deserialize, Serialize};

/// One parsed playlist item.
///
/// `raw_directive` keeps the original `#EXTINF` line verbatim; the extracted
/// fields exist for classification, dedup, ordering and reporting. The
/// serializer always rewrites from `raw_directive`, never from the extracted
/// fields, so attributes we do not understand survive untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    /// Original directive line, unmodified
    pub raw_directive: String,
    /// Stream URL from the line following the directive; never empty
    pub stream_url: String,
    /// Text after the final comma of the directive line; empty if no comma
    pub display_name: String,
    /// `tvg-id` attribute; `None` when absent or empty
    pub tvg_id: Option<String>,
    /// `group-title` attribute; `None` when absent or empty
    pub group_title: Option<String>,
    /// Raw `tvg-chno` attribute as written in the source; may be garbage
    pub tvg_chno: Option<String>,
    /// Duration from the directive's leading numeric token; `-1.0` means live
    pub duration_secs: f64,
    /// URL of the source this entry was parsed from
    pub origin_source: String,
    /// Set by the classifier; false until classification runs
    pub is_designated: bool,
}

impl PlaylistEntry {
    /// The pre-existing channel number, if it is usable.
    ///
    /// Absent, non-numeric and non-positive values are all treated the same
    /// way: the entry has no valid number and will receive a fresh one.
    pub fn valid_channel_number(&self) -> Option<u32> {
        self.tvg_chno
            .as_deref()?
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
    }
}

/// Fully resolved policy for a single pipeline run.
///
/// Source-table keys have already been resolved to URLs by the policy store
/// (plus any per-request overrides); the pipeline only ever sees locators.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePolicy {
    /// Ordered source URLs; order decides dedup precedence
    pub sources: Vec<String>,
    /// Designated-source URL, when one is configured
    pub designated_source: Option<String>,
    /// Whether the serializer rewrites group labels
    pub rewrite_labels: bool,
}

impl MergePolicy {
    /// The designated-source locator, with blank values treated as unset.
    pub fn designated_locator(&self) -> Option<&str> {
        self.designated_source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Which of the two output documents a request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputVariant {
    /// Everything that survives dedup
    Merged,
    /// Only entries matching the designation predicate
    DesignatedOnly,
}

impl OutputVariant {
    /// Filename hint used in the content-disposition header
    pub fn filename(&self) -> &'static str {
        match self {
            OutputVariant::Merged => "merged.m3u",
            OutputVariant::DesignatedOnly => "designated.m3u",
        }
    }

    pub fn is_designated_only(&self) -> bool {
        matches!(self, OutputVariant::DesignatedOnly)
    }
}

/// One row of the configurable source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Short key used in overrides and the config API
    pub key: String,
    /// Playlist URL
    pub url: String,
    /// Disabled sources stay in the table but are skipped at resolve time
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Immutable label lookup injected into the serializer.
///
/// Designated entries always get `designated_label`. Other labels are
/// normalized by case-insensitive substring match against the ordered rule
/// list; the first matching keyword wins, unmatched labels pass through
/// unchanged, and a missing or empty label becomes `uncategorized_label`.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    pub designated_label: String,
    pub uncategorized_label: String,
    rules: Vec<(String, String)>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let rules = [
            ("news", "News"),
            ("sport", "Sports"),
            ("movie", "Movies"),
            ("film", "Movies"),
            ("cinema", "Movies"),
            ("kids", "Kids"),
            ("cartoon", "Kids"),
            ("music", "Music"),
            ("doc", "Documentary"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            designated_label: "Chinese".to_string(),
            uncategorized_label: "Uncategorized".to_string(),
            rules,
        }
    }
}

impl CategoryTable {
    /// Normalize a non-designated group label.
    pub fn category_for(&self, label: Option<&str>) -> String {
        let Some(label) = label.filter(|l| !l.trim().is_empty()) else {
            return self.uncategorized_label.clone();
        };
        let lowered = label.to_lowercase();
        for (keyword, category) in &self.rules {
            if lowered.contains(keyword.as_str()) {
                return category.clone();
            }
        }
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_chno(chno: Option<&str>) -> PlaylistEntry {
        PlaylistEntry {
            raw_directive: "#EXTINF:-1,Test".to_string(),
            stream_url: "http://example.com/s".to_string(),
            display_name: "Test".to_string(),
            tvg_id: None,
            group_title: None,
            tvg_chno: chno.map(|c| c.to_string()),
            duration_secs: -1.0,
            origin_source: "http://example.com/list.m3u".to_string(),
            is_designated: false,
        }
    }

    #[test]
    fn valid_channel_number_accepts_positive_integers() {
        assert_eq!(entry_with_chno(Some("12")).valid_channel_number(), Some(12));
        assert_eq!(
            entry_with_chno(Some(" 101 ")).valid_channel_number(),
            Some(101)
        );
    }

    #[test]
    fn valid_channel_number_rejects_absent_garbage_and_non_positive() {
        assert_eq!(entry_with_chno(None).valid_channel_number(), None);
        assert_eq!(entry_with_chno(Some("abc")).valid_channel_number(), None);
        assert_eq!(entry_with_chno(Some("12abc")).valid_channel_number(), None);
        assert_eq!(entry_with_chno(Some("0")).valid_channel_number(), None);
        assert_eq!(entry_with_chno(Some("-5")).valid_channel_number(), None);
        assert_eq!(entry_with_chno(Some("12.5")).valid_channel_number(), None);
    }

    #[test]
    fn category_table_first_match_wins() {
        let table = CategoryTable::default();
        assert_eq!(table.category_for(Some("World News HD")), "News");
        assert_eq!(table.category_for(Some("SPORTS channels")), "Sports");
        assert_eq!(table.category_for(Some("documentaries")), "Documentary");
    }

    #[test]
    fn category_table_passes_through_unmatched_labels() {
        let table = CategoryTable::default();
        assert_eq!(table.category_for(Some("Regional")), "Regional");
    }

    #[test]
    fn category_table_defaults_empty_labels() {
        let table = CategoryTable::default();
        assert_eq!(table.category_for(None), "Uncategorized");
        assert_eq!(table.category_for(Some("")), "Uncategorized");
        assert_eq!(table.category_for(Some("   ")), "Uncategorized");
    }
}
