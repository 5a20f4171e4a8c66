//! Playlist aggregation pipeline.
//!
//! Stage order is fixed and load-bearing:
//!
//! 1. fetch all sources concurrently
//! 2. parse each document, tagging entries with their origin
//! 3. concatenate in source order
//! 4. classify designated entries
//! 5. filter to designated entries (designated-only variant)
//! 6. deduplicate by stream URL, then by tvg-id (first wins)
//! 7. sort by display name, then tvg-id
//! 8. number and serialize, or render the diagnostics report
//!
//! Dedup runs before the sort so that "first wins" means first in source
//! order, and the filter runs before dedup so a designated entry can never
//! lose its URL or id claim to a non-designated copy that gets filtered
//! out anyway.

pub mod classifier;
pub mod dedup;
pub mod numbering;
pub mod parser;
pub mod report;
pub mod serializer;

use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::{CategoryTable, MergePolicy, OutputVariant, PlaylistEntry};
use crate::sources::{FetchedDocument, PlaylistFetcher, fetch_all};

/// Parse, classify, filter, dedup and sort fetched documents into the
/// final entry sequence. Everything downstream (document, report) works
/// on this sequence.
pub fn assemble(
    documents: &[FetchedDocument],
    policy: &MergePolicy,
    variant: OutputVariant,
) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();
    for document in documents {
        entries.extend(parser::parse_playlist(&document.body, &document.source));
    }

    classifier::classify_entries(&mut entries, policy);
    if variant.is_designated_only() {
        entries = classifier::apply_designated_filter(entries, policy);
    }

    let mut entries = dedup::dedupe_entries(entries);
    entries.sort_by(|a, b| {
        a.display_name.cmp(&b.display_name).then_with(|| {
            a.tvg_id
                .as_deref()
                .unwrap_or("")
                .cmp(b.tvg_id.as_deref().unwrap_or(""))
        })
    });
    entries
}

/// Number the sequence and serialize it as an extended M3U document.
pub fn render_document(
    entries: &[PlaylistEntry],
    policy: &MergePolicy,
    categories: &CategoryTable,
) -> String {
    let numbers = numbering::assign_channel_numbers(entries);
    serializer::serialize_document(entries, &numbers, policy, categories)
}

/// Run the whole pipeline for one request.
///
/// Returns the rendered M3U document, or the plain-text diagnostics
/// report when `debug_report` is set. An empty source list is a
/// configuration error: the request fails instead of silently producing
/// a header-only document.
pub async fn run(
    fetcher: &dyn PlaylistFetcher,
    policy: &MergePolicy,
    categories: &CategoryTable,
    variant: OutputVariant,
    debug_report: bool,
) -> AppResult<String> {
    if policy.sources.is_empty() {
        return Err(AppError::configuration("no playlist sources configured"));
    }

    let documents = fetch_all(fetcher, &policy.sources).await;
    let entries = assemble(&documents, policy, variant);
    info!(
        "Aggregated {} entries from {} sources for {}",
        entries.len(),
        documents.len(),
        variant.filename()
    );

    if debug_report {
        Ok(report::build_report(
            &entries,
            policy,
            categories,
            variant.is_designated_only(),
        ))
    } else {
        Ok(render_document(&entries, policy, categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppResult;
    use async_trait::async_trait;

    struct StubFetcher;

    #[async_trait]
    impl PlaylistFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> AppResult<String> {
            Ok("#EXTM3U\n#EXTINF:-1,Alpha\nhttp://stream/alpha".to_string())
        }
    }

    fn document(source: &str, body: &str) -> FetchedDocument {
        FetchedDocument {
            source: source.to_string(),
            body: body.to_string(),
        }
    }

    fn open_policy(sources: &[&str]) -> MergePolicy {
        MergePolicy {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            designated_source: None,
            rewrite_labels: false,
        }
    }

    #[tokio::test]
    async fn empty_source_list_is_a_configuration_error() {
        let policy = open_policy(&[]);
        let result = run(
            &StubFetcher,
            &policy,
            &CategoryTable::default(),
            OutputVariant::Merged,
            false,
        )
        .await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn sequence_is_sorted_by_name_then_id() {
        let documents = vec![document(
            "http://a.example/list.m3u",
            concat!(
                "#EXTM3U\n",
                "#EXTINF:-1 tvg-id=\"b2\",Beta\nhttp://stream/1\n",
                "#EXTINF:-1,Alpha\nhttp://stream/2\n",
                "#EXTINF:-1 tvg-id=\"b1\",Beta\nhttp://stream/3\n",
            ),
        )];
        let entries = assemble(
            &documents,
            &open_policy(&["http://a.example/list.m3u"]),
            OutputVariant::Merged,
        );

        let order: Vec<(&str, Option<&str>)> = entries
            .iter()
            .map(|e| (e.display_name.as_str(), e.tvg_id.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Alpha", None),
                ("Beta", Some("b1")),
                ("Beta", Some("b2")),
            ]
        );
    }

    #[test]
    fn dedup_keeps_source_order_winner_even_when_sort_reverses_it() {
        // "Zulu" comes first in source order and must win the URL claim,
        // even though the final sort places it last.
        let documents = vec![
            document(
                "http://first.example/list.m3u",
                "#EXTM3U\n#EXTINF:-1,Zulu\nhttp://stream/shared\n",
            ),
            document(
                "http://second.example/list.m3u",
                "#EXTM3U\n#EXTINF:-1,Alpha\nHTTP://STREAM/shared\n",
            ),
        ];
        let entries = assemble(
            &documents,
            &open_policy(&[
                "http://first.example/list.m3u",
                "http://second.example/list.m3u",
            ]),
            OutputVariant::Merged,
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Zulu");
    }

    #[test]
    fn designated_filter_runs_before_dedup() {
        // The non-designated copy of the shared URL appears first in
        // source order. Filtering before dedup means it never gets the
        // chance to claim the URL away from the designated copy.
        let documents = vec![
            document(
                "http://other.example/list.m3u",
                "#EXTM3U\n#EXTINF:-1,News\nhttp://stream/shared\n",
            ),
            document(
                "http://designated.example/list.m3u",
                "#EXTM3U\n#EXTINF:-1,News\nhttp://stream/shared\n",
            ),
        ];
        let mut policy = open_policy(&[
            "http://other.example/list.m3u",
            "http://designated.example/list.m3u",
        ]);
        policy.designated_source = Some("http://designated.example/list.m3u".to_string());

        let entries = assemble(&documents, &policy, OutputVariant::DesignatedOnly);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].origin_source, "http://designated.example/list.m3u");
    }

    #[tokio::test]
    async fn run_produces_a_document_or_a_report() {
        let policy = open_policy(&["http://a.example/list.m3u"]);
        let categories = CategoryTable::default();

        let playlist = run(
            &StubFetcher,
            &policy,
            &categories,
            OutputVariant::Merged,
            false,
        )
        .await
        .unwrap();
        assert!(playlist.starts_with("#EXTM3U\n"));
        assert!(playlist.contains("tvg-chno=\"101\""));

        let report = run(
            &StubFetcher,
            &policy,
            &categories,
            OutputVariant::Merged,
            true,
        )
        .await
        .unwrap();
        assert!(report.starts_with("Total channels: 1"));
    }
}
