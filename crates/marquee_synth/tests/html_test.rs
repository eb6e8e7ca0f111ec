//! Tests for the HTML snippet.

use marquee_core::{ContentRecord, LinkEntry, MediaKind, PosterSource};
use marquee_synth::{
    DOWNLOAD_ANCHOR_CLASS, GateOptionsBuilder, HtmlOptions, NO_LINKS_CLASS, render_html,
};

fn record() -> ContentRecord {
    let mut record = ContentRecord::new("Spirited Away", MediaKind::Movie);
    record.year = Some(2001);
    record.rating = Some(8.5);
    record.genres = vec!["Animation".into(), "Fantasy".into()];
    record.overview = "A girl wanders into a world of spirits.".into();
    record.cast = vec!["Rumi Hiiragi".into()];
    record.poster = PosterSource::Remote("https://image.tmdb.org/t/p/w500/sa.jpg".into());
    record
}

fn count(haystack: &str, class: &str) -> usize {
    haystack.matches(&format!("class=\"{}\"", class)).count()
}

fn links(n: usize) -> Vec<LinkEntry> {
    (0..n)
        .map(|i| {
            LinkEntry::new(format!("Part {}", i + 1), format!("https://dl.example/{}", i)).unwrap()
        })
        .collect()
}

#[test]
fn test_one_anchor_per_link() {
    for n in [1, 2, 5] {
        let html = render_html(&record(), &links(n), &HtmlOptions::plain()).unwrap();
        assert_eq!(count(&html, DOWNLOAD_ANCHOR_CLASS), n);
        assert_eq!(count(&html, NO_LINKS_CLASS), 0);
    }
}

#[test]
fn test_placeholder_when_no_links() {
    let html = render_html(&record(), &[], &HtmlOptions::plain()).unwrap();
    assert_eq!(count(&html, DOWNLOAD_ANCHOR_CLASS), 0);
    assert_eq!(count(&html, NO_LINKS_CLASS), 1);
}

#[test]
fn test_metadata_sections() {
    let mut record = record();
    record.language = Some("Japanese".into());
    let html = render_html(&record, &[], &HtmlOptions::plain()).unwrap();

    assert!(html.contains("Spirited Away (2001)"));
    assert!(html.contains("[Japanese]"));
    assert!(html.contains("8.5"));
    assert!(html.contains("Animation, Fantasy"));
    assert!(html.contains("Storyline"));
    assert!(html.contains("Rumi Hiiragi"));
    assert!(html.contains("class=\"mq-poster\""));
    assert!(!html.contains("Screenshot"));
    assert!(!html.contains("<script>"));
}

#[test]
fn test_user_text_is_escaped() {
    let mut record = record();
    record.set_title("<b>Bold</b> & Co");
    let html = render_html(&record, &[], &HtmlOptions::plain()).unwrap();

    assert!(!html.contains("<b>Bold</b>"));
    assert!(html.contains("&lt;b&gt;"));
}

#[test]
fn test_gated_downloads_include_script_and_hidden_anchors() {
    let gate = GateOptionsBuilder::default()
        .ad_url("https://ads.example/go")
        .countdown_secs(5u32)
        .counter_seed(2500u64)
        .build()
        .unwrap();
    let html = render_html(&record(), &links(2), &HtmlOptions::gated(gate)).unwrap();

    assert_eq!(count(&html, DOWNLOAD_ANCHOR_CLASS), 2);
    assert_eq!(count(&html, "dl-gate"), 2);
    assert!(html.contains("<script>"));
    assert!(html.contains("var COUNTDOWN = 5;"));
    assert!(html.contains("var SEED = 2500;"));
    assert!(html.contains("localStorage"));
    assert!(html.contains("style=\"display:none\""));
}

#[test]
fn test_uploaded_poster_becomes_data_uri() {
    let mut record = record();
    // PNG signature followed by filler
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 16]);
    record.poster = PosterSource::Uploaded(bytes);

    let html = render_html(&record, &[], &HtmlOptions::plain()).unwrap();
    assert!(html.contains("data:image"));
    assert!(html.contains("png;base64,iVBORw0KGgo"));
}

#[test]
fn test_rendering_is_deterministic() {
    let a = render_html(&record(), &links(3), &HtmlOptions::plain()).unwrap();
    let b = render_html(&record(), &links(3), &HtmlOptions::plain()).unwrap();
    assert_eq!(a, b);
}
