/*!
 * End-to-end pipeline tests over in-memory playlist documents.
 *
 * These run the real assemble/render path (parse, classify, filter,
 * dedup, sort, number, serialize) without the HTTP layer, covering the
 * externally observable contracts:
 *
 * 1. Pre-existing valid channel numbers are kept; fresh ones start at 101.
 * 2. Dedup is case-insensitive on stream URL and tvg-id, first in source
 *    order wins, and it runs before the name sort.
 * 3. The designated-only variant filters by origin source, falling back
 *    to script-based classification when the designated source
 *    contributed nothing.
 * 4. Comma-less directives pass through verbatim but still consume a
 *    channel number.
 * 5. The whole pipeline is deterministic: same inputs, same bytes.
 */

use m3u_aggregator::models::{CategoryTable, MergePolicy, OutputVariant};
use m3u_aggregator::pipeline::{assemble, numbering::assign_channel_numbers, render_document};
use m3u_aggregator::sources::FetchedDocument;

fn doc(source: &str, body: &str) -> FetchedDocument {
    FetchedDocument {
        source: source.to_string(),
        body: body.to_string(),
    }
}

fn merge_policy(sources: &[&str], designated: Option<&str>) -> MergePolicy {
    MergePolicy {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        designated_source: designated.map(|s| s.to_string()),
        rewrite_labels: false,
    }
}

fn render(documents: &[FetchedDocument], policy: &MergePolicy, variant: OutputVariant) -> String {
    let entries = assemble(documents, policy, variant);
    render_document(&entries, policy, &CategoryTable::default())
}

#[test]
fn two_distinct_sources_number_from_101_in_name_order() {
    // Scenario: two sources, one entry each, nothing colliding.
    let documents = vec![
        doc(
            "http://one.example/list.m3u",
            "#EXTM3U\n#EXTINF:-1 tvg-id=\"beta\",Beta\nhttp://host/b\n",
        ),
        doc(
            "http://two.example/list.m3u",
            "#EXTM3U\n#EXTINF:-1 tvg-id=\"alpha\",Alpha\nhttp://host/a\n",
        ),
    ];
    let policy = merge_policy(
        &["http://one.example/list.m3u", "http://two.example/list.m3u"],
        None,
    );

    let output = render(&documents, &policy, OutputVariant::Merged);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "#EXTM3U",
            "#EXTINF:-1 tvg-id=\"alpha\" tvg-chno=\"101\",Alpha",
            "http://host/a",
            "#EXTINF:-1 tvg-id=\"beta\" tvg-chno=\"102\",Beta",
            "http://host/b",
        ]
    );
    assert!(output.ends_with('\n'));
}

#[test]
fn preexisting_number_survives_and_does_not_block_the_floor() {
    // Scenario: "5" is kept as-is and the fresh entry still starts at 101.
    let documents = vec![doc(
        "http://one.example/list.m3u",
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-chno=\"5\",Beta\nhttp://host/b\n",
            "#EXTINF:-1,Alpha\nhttp://host/a\n",
        ),
    )];
    let policy = merge_policy(&["http://one.example/list.m3u"], None);

    let output = render(&documents, &policy, OutputVariant::Merged);
    assert!(output.contains("#EXTINF:-1 tvg-chno=\"101\",Alpha"));
    assert!(output.contains("#EXTINF:-1 tvg-chno=\"5\",Beta"));
}

#[test]
fn shared_stream_url_keeps_the_first_source_copy() {
    // Scenario: identical stream target differing only in case.
    let documents = vec![
        doc(
            "http://one.example/list.m3u",
            "#EXTM3U\n#EXTINF:-1,First Copy\nhttp://host/shared\n",
        ),
        doc(
            "http://two.example/list.m3u",
            "#EXTM3U\n#EXTINF:-1,Second Copy\nHTTP://HOST/SHARED\n",
        ),
    ];
    let policy = merge_policy(
        &["http://one.example/list.m3u", "http://two.example/list.m3u"],
        None,
    );

    let entries = assemble(&documents, &policy, OutputVariant::Merged);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, "First Copy");
    assert_eq!(entries[0].stream_url, "http://host/shared");
}

#[test]
fn comma_less_directive_passes_through_but_consumes_a_number() {
    // The malformed directive sorts first (empty display name), eats 101,
    // and is emitted untouched. The well-formed entry lands on 102.
    let documents = vec![doc(
        "http://one.example/list.m3u",
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 tvg-id=\"x\"\nhttp://host/odd\n",
            "#EXTINF:-1,Alpha\nhttp://host/a\n",
        ),
    )];
    let policy = merge_policy(&["http://one.example/list.m3u"], None);

    let output = render(&documents, &policy, OutputVariant::Merged);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "#EXTM3U",
            "#EXTINF:-1 tvg-id=\"x\"",
            "http://host/odd",
            "#EXTINF:-1 tvg-chno=\"102\",Alpha",
            "http://host/a",
        ]
    );
}

#[test]
fn designated_only_output_filters_by_origin_source() {
    let designated = "http://designated.example/list.m3u";
    let documents = vec![
        doc(
            "http://other.example/list.m3u",
            "#EXTM3U\n#EXTINF:-1,English News\nhttp://host/en\n",
        ),
        doc(
            designated,
            "#EXTM3U\n#EXTINF:-1,Latin Name Channel\nhttp://host/zh\n",
        ),
    ];
    let policy = merge_policy(
        &["http://other.example/list.m3u", designated],
        Some(designated),
    );

    let entries = assemble(&documents, &policy, OutputVariant::DesignatedOnly);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].origin_source, designated);
    assert!(entries.iter().all(|e| e.is_designated));
}

#[test]
fn empty_designated_source_falls_back_to_script_classification() {
    // Scenario: the designated source fetched nothing, so the filter
    // falls back to classifying by CJK ideographs in the display name.
    let documents = vec![doc(
        "http://other.example/list.m3u",
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1,English News\nhttp://host/en\n",
            "#EXTINF:-1,中文新闻\nhttp://host/zh1\n",
            "#EXTINF:-1,凤凰卫视\nhttp://host/zh2\n",
        ),
    )];
    let policy = merge_policy(
        &["http://other.example/list.m3u"],
        Some("http://empty.example/list.m3u"),
    );

    let entries = assemble(&documents, &policy, OutputVariant::DesignatedOnly);
    let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, vec!["中文新闻", "凤凰卫视"]);
}

#[test]
fn output_satisfies_dedup_and_numbering_invariants() {
    let documents = vec![
        doc(
            "http://one.example/list.m3u",
            concat!(
                "#EXTM3U\n",
                "#EXTINF:-1 tvg-id=\"one\" tvg-chno=\"5\",Echo\nhttp://host/stream1\n",
                "#EXTINF:-1 tvg-id=\"two\" tvg-chno=\"101\",Delta\nhttp://host/stream2\n",
                "#EXTINF:-1 tvg-id=\"TWO\",Delta Dup\nhttp://host/stream3\n",
                "#EXTINF:-1 tvg-chno=\"0\",Zero\nhttp://host/stream4\n",
                "#EXTINF:-1 tvg-chno=\"12abc\",BadNum\nhttp://host/stream5\n",
            ),
        ),
        doc(
            "http://two.example/list.m3u",
            concat!(
                "#EXTM3U\n",
                "#EXTINF:-1 tvg-id=\"three\" tvg-chno=\"5\",Later Five\nhttp://host/stream6\n",
                "#EXTINF:-1,NoId\nHTTP://HOST/STREAM1\n",
                "#EXTINF:-1,Fresh\nhttp://host/stream7\n",
            ),
        ),
    ];
    let policy = merge_policy(
        &["http://one.example/list.m3u", "http://two.example/list.m3u"],
        None,
    );

    let entries = assemble(&documents, &policy, OutputVariant::Merged);
    let numbers = assign_channel_numbers(&entries);

    // Dedup invariant: no repeated stream URL or non-empty tvg-id,
    // case-insensitively.
    let mut urls = std::collections::HashSet::new();
    let mut ids = std::collections::HashSet::new();
    for entry in &entries {
        assert!(urls.insert(entry.stream_url.to_lowercase()));
        if let Some(id) = &entry.tvg_id {
            assert!(ids.insert(id.to_lowercase()));
        }
    }

    // Numbering invariants: positive, unique, first claimant keeps its
    // number, duplicates and invalid claims get the smallest free >= 101.
    let assigned: Vec<(&str, u32)> = entries
        .iter()
        .zip(&numbers)
        .map(|(e, n)| (e.display_name.as_str(), *n))
        .collect();
    assert_eq!(
        assigned,
        vec![
            ("BadNum", 102),
            ("Delta", 101),
            ("Echo", 5),
            ("Fresh", 103),
            ("Later Five", 104),
            ("Zero", 105),
        ]
    );
}

#[test]
fn pipeline_output_is_deterministic() {
    let documents = vec![
        doc(
            "http://one.example/list.m3u",
            concat!(
                "#EXTM3U\n",
                "#EXTINF:-1 tvg-id=\"n1\" group-title=\"News\" tvg-chno=\"150\",News One\nhttp://host/n1\n",
                "#EXTINF:-1,合家欢\nhttp://host/zh\n",
            ),
        ),
        doc(
            "http://two.example/list.m3u",
            "#EXTM3U\n#EXTINF:-1 tvg-id=\"m1\",Movies One\nhttp://host/m1\n",
        ),
    ];
    let mut policy = merge_policy(
        &["http://one.example/list.m3u", "http://two.example/list.m3u"],
        None,
    );
    policy.rewrite_labels = true;

    let first = render(&documents, &policy, OutputVariant::Merged);
    let second = render(&documents, &policy, OutputVariant::Merged);
    assert_eq!(first, second);
    assert!(first.contains("group-title=\"News\""));
    assert!(first.contains("group-title=\"Chinese\""));
    assert!(first.contains("group-title=\"Uncategorized\""));
}
