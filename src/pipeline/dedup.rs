//! First-occurrence deduplication across sources.
//!
//! Two lower-cased seen-sets, one for stream URLs and one for non-empty
//! `tvg-id`s. The first occurrence in concatenation order wins, so earlier
//! sources take precedence over later ones even when the later copy carries
//! different attributes. Entries without an id never collide with each other
//! on the id axis.

use std::collections::HashSet;
use tracing::debug;

use crate::models::PlaylistEntry;

pub fn dedupe_entries(entries: Vec<PlaylistEntry>) -> Vec<PlaylistEntry> {
    let total = entries.len();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(total);

    for entry in entries {
        let url_key = entry.stream_url.to_lowercase();
        if seen_urls.contains(&url_key) {
            continue;
        }
        let id_key = entry.tvg_id.as_deref().map(str::to_lowercase);
        if let Some(id) = &id_key {
            if seen_ids.contains(id) {
                continue;
            }
        }

        seen_urls.insert(url_key);
        if let Some(id) = id_key {
            seen_ids.insert(id);
        }
        kept.push(entry);
    }

    debug!("Dedup kept {} of {} entries", kept.len(), total);
    kept
}
