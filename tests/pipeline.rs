//! Pipeline integration tests over synthetic spans.
//!
//! These exercise the full span-to-records pipeline (color gate, candidate
//! generation, grammar, disambiguation, normalisation, positional dedup)
//! without touching pdfium, so they run everywhere with no fixtures.

use drawcodes::pipeline::{color, Pipeline};
use drawcodes::{BBox, CodeGrammar, ExtractionMethod, Rgb, Span, SpanColor};
use std::sync::Arc;

// ── Helpers ──────────────────────────────────────────────────────────────

fn pipeline() -> Pipeline {
    Pipeline::new(
        Arc::new(CodeGrammar::new()),
        color::DEFAULT_GREEN_MIN,
        color::DEFAULT_DOMINANCE,
    )
}

fn span(page: usize, text: &str, color: SpanColor, bbox: BBox) -> Span {
    Span {
        page,
        text: text.to_string(),
        color,
        bbox,
    }
}

fn green(page: usize, text: &str) -> Span {
    green_at(page, text, BBox::default())
}

fn green_at(page: usize, text: &str, bbox: BBox) -> Span {
    span(page, text, SpanColor::Components(vec![0.1, 0.8, 0.1]), bbox)
}

fn codes(p: &Pipeline, spans: &[Span]) -> Vec<String> {
    p.run(spans, ExtractionMethod::Text)
        .records
        .into_iter()
        .map(|r| r.code)
        .collect()
}

// ── Color gate ───────────────────────────────────────────────────────────

#[test]
fn marker_threshold_is_strict() {
    // g == 110 fails, g == 111 passes (with r = b = 0).
    assert!(!color::is_marker_color(Rgb::new(0, 110, 0), 110, 20));
    assert!(color::is_marker_color(Rgb::new(0, 111, 0), 110, 20));
    // dominance is strict too: g must exceed r + 20, not merely reach it.
    assert!(!color::is_marker_color(Rgb::new(180, 200, 0), 110, 20));
    assert!(color::is_marker_color(Rgb::new(179, 200, 0), 110, 20));
}

#[test]
fn all_span_color_encodings_reach_the_gate() {
    let p = pipeline();
    let bright_green_packed = SpanColor::Packed(0x00C800); // (0, 200, 0)
    let bright_green_frac = SpanColor::Components(vec![0.0, 0.8, 0.0]);
    let bright_green_bytes = SpanColor::Components(vec![0.0, 200.0, 0.0]);

    for (i, c) in [bright_green_packed, bright_green_frac, bright_green_bytes]
        .into_iter()
        .enumerate()
    {
        let bbox = BBox::new(i as f32 * 100.0, 0.0, i as f32 * 100.0 + 20.0, 10.0);
        let found = codes(&p, &[span(1, "ABN-7", c, bbox)]);
        assert_eq!(found, vec!["ABN-7"], "encoding #{i} should pass the gate");
    }
}

#[test]
fn grey_and_white_text_is_rejected() {
    let p = pipeline();
    for c in [
        SpanColor::Components(vec![0.5, 0.5, 0.5]),
        SpanColor::Components(vec![1.0, 1.0, 1.0]),
        SpanColor::Packed(0x000000),
    ] {
        assert!(codes(&p, &[span(1, "ABN-7", c, BBox::default())]).is_empty());
    }
}

// ── Candidate splitting and disambiguation ───────────────────────────────

#[test]
fn concatenated_invalid_whole_splits_into_parts() {
    // TEU3 matches no rule as a whole; its pieces TE and U3 both do.
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "TEU3")]), vec!["TE", "U3"]);
}

#[test]
fn valid_compound_yields_its_parts_not_both() {
    // S1NS3R is grammar-valid via the S-family rule, but both parts are
    // independently generated and valid, so the compound is dropped.
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "S1NS3R")]), vec!["S1N", "S3R"]);
}

#[test]
fn space_merged_labels_yield_parts() {
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "S1N S3R")]), vec!["S1N", "S3R"]);
}

#[test]
fn chained_codes_stay_whole() {
    let p = pipeline();
    // The dot chain is one unit; its halves are never generated separately.
    assert_eq!(codes(&p, &[green(1, "CE1(2).CE3(1)")]), vec!["CE1.CE3"]);
    // Same for the hyphen chain.
    assert_eq!(codes(&p, &[green(2, "CM3-CM3(1)")]), vec!["CM3-CM3"]);
}

#[test]
fn single_label_never_yields_a_phantom_suffix() {
    // CM3(1) and AN3(2) contain a code-initial letter mid-label; a naive
    // cut there would leave M3(1) / N3(2) as extra codes alongside the
    // real one. Each physical label must come out exactly once.
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "CM3(1)")]), vec!["CM3"]);
    assert_eq!(codes(&p, &[green(1, "AN3(2)")]), vec!["AN3"]);
}

#[test]
fn juxtaposed_parenthesised_labels_split() {
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "TE(1)U3(2)")]), vec!["TE", "U3"]);
}

// ── Normalisation in context ─────────────────────────────────────────────

#[test]
fn quantities_are_stripped_from_output() {
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "U3(1)")]), vec!["U3"]);
    assert_eq!(codes(&p, &[green(1, "AN3(2)")]), vec!["AN3"]);
}

#[test]
fn truncated_label_normalises_clean() {
    let p = pipeline();
    assert_eq!(codes(&p, &[green(1, "CM2(")]), vec!["CM2"]);
}

// ── Ordering and dedup ───────────────────────────────────────────────────

#[test]
fn output_follows_document_order() {
    let p = pipeline();
    let spans = vec![
        green_at(1, "U3(1)", BBox::new(0.0, 0.0, 20.0, 10.0)),
        green_at(1, "ABN-7", BBox::new(0.0, 50.0, 20.0, 60.0)),
        green_at(2, "CE1", BBox::new(0.0, 0.0, 20.0, 10.0)),
    ];
    assert_eq!(codes(&p, &spans), vec!["U3", "ABN-7", "CE1"]);
}

#[test]
fn overdrawn_label_counts_once_but_repeats_elsewhere_count() {
    let p = pipeline();
    let here = BBox::new(10.0, 10.0, 40.0, 20.0);
    let there = BBox::new(300.0, 10.0, 330.0, 20.0);
    let spans = vec![
        green_at(1, "CM3(1)", here),
        green_at(1, "CM3(1)", here), // overdraw: identical position
        green_at(1, "CM3(1)", there),
        green_at(2, "CM3(1)", here), // new page: counts again
    ];
    assert_eq!(codes(&p, &spans), vec!["CM3", "CM3", "CM3"]);
}

#[test]
fn distinct_quantities_at_same_spot_both_count() {
    // U3(1) and U3(2) normalise to the same code but are different raw
    // labels, so the positional dedup keys them apart.
    let p = pipeline();
    let bbox = BBox::new(10.0, 10.0, 40.0, 20.0);
    let spans = vec![green_at(1, "U3(1)", bbox), green_at(1, "U3(2)", bbox)];
    assert_eq!(codes(&p, &spans), vec!["U3", "U3"]);
}

// ── Provenance records ───────────────────────────────────────────────────

#[test]
fn records_carry_page_color_and_raw_text() {
    let p = pipeline();
    let run = p.run(
        &[span(
            3,
            "U3(1)",
            SpanColor::Packed(0x00C800),
            BBox::new(1.0, 2.0, 3.0, 4.0),
        )],
        ExtractionMethod::Text,
    );
    assert_eq!(run.records.len(), 1);
    let r = &run.records[0];
    assert_eq!(r.page, 3);
    assert_eq!(r.code, "U3");
    assert_eq!(r.raw_text, "U3(1)");
    assert_eq!(r.rgb, Rgb::new(0, 200, 0));
    assert_eq!(r.method, ExtractionMethod::Text);
}

#[test]
fn records_serialise_to_json() {
    let p = pipeline();
    let run = p.run(&[green(1, "ABN-7")], ExtractionMethod::Text);
    let json = serde_json::to_string(&run.records).unwrap();
    assert!(json.contains("\"ABN-7\""));
    assert!(json.contains("\"method\":\"text\""));
}

// ── Whole-document behaviour without pdfium ──────────────────────────────

#[tokio::test]
async fn extract_rejects_non_pdf_bytes() {
    use drawcodes::{extract_from_bytes, ExtractConfig, ExtractError};

    let err = extract_from_bytes(b"PK\x03\x04 definitely a zip", &ExtractConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::NotAPdf { .. }), "got: {err}");
}

#[tokio::test]
async fn extract_reports_missing_file() {
    use drawcodes::{extract, ExtractConfig, ExtractError};

    let err = extract("/no/such/drawing.pdf", &ExtractConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::FileNotFound { .. }));
}
