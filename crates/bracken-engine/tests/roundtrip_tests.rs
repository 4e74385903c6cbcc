//! Round-trip and totality tests across both directions.

use quickcheck_macros::quickcheck;

use bracken_dom::reader::parse_fragment;
use bracken_engine::BBCodeEngine;

/// Helper: markup → HTML → element tree → markup must reproduce the input.
fn assert_round_trip(markup: &str) {
    let engine = BBCodeEngine::new();
    let html = engine.to_html(markup);
    let back = engine.to_markup(&parse_fragment(&html));
    assert_eq!(back, markup, "via {html}");
}

#[test]
fn test_simple_round_trips() {
    assert_round_trip("[b]hi[/b]");
    assert_round_trip("[i]x[/i]");
    assert_round_trip("[u]x[/u]");
    assert_round_trip("[s]x[/s]");
    assert_round_trip("[sub]x[/sub]");
    assert_round_trip("[sup]x[/sup]");
}

#[test]
fn test_attribute_round_trips() {
    assert_round_trip("[url=http://a.com/x]link[/url]");
    assert_round_trip("[quote=\"John Doe\"]text[/quote]");
    assert_round_trip("[quote=John]text[/quote]");
    assert_round_trip("[color=#ff0000]red[/color]");
    assert_round_trip("[size=3]x[/size]");
    assert_round_trip("[font=Arial]x[/font]");
    assert_round_trip("[img]http://a/b.png[/img]");
}

#[test]
fn test_structural_round_trips() {
    assert_round_trip("[ul][li]a[/li]\n[li]b[/li][/ul]");
    assert_round_trip("[code]let x = 1;[/code]");
    assert_round_trip("[center]mid[/center]");
    assert_round_trip("[hr]");
    assert_round_trip("line1\nline2");
}

#[test]
fn test_mixed_inline_round_trip() {
    assert_round_trip("a [b]bold [i]both[/i][/b] tail");
}

#[test]
fn test_implicit_closes_normalize() {
    // Implicitly closed items come back with explicit closing tags.
    let engine = BBCodeEngine::new();
    let html = engine.to_html("[ul][li]a[li]b[/ul]");
    assert_eq!(
        engine.to_markup(&parse_fragment(&html)),
        "[ul][li]a[/li]\n[li]b[/li][/ul]"
    );
}

#[test]
fn test_overlap_normalizes_to_nested_siblings() {
    let engine = BBCodeEngine::new();
    let html = engine.to_html("[b]one [i]two[/b] three[/i]");
    assert_eq!(
        engine.to_markup(&parse_fragment(&html)),
        "[b]one [i]two[/i][/b][i] three[/i]"
    );
}

#[test]
fn test_bracket_soup_is_total() {
    let cases = [
        "[",
        "]",
        "[[",
        "[]",
        "[/",
        "[/]",
        "[b",
        "b]",
        "[b][i][/b][/i]",
        "[/b][/b][/b]",
        "[b=\"]x",
        "[quote=\"unterminated]x",
        "[ul][/table][li][td]x",
        "\r\n\r\r\n",
        "[b][b][b][b]x",
    ];
    let engine = BBCodeEngine::new();
    for case in cases {
        // Conversion must terminate and return something for any input.
        let _ = engine.to_html(case);
        let _ = engine.to_html_fragment(case);
        let _ = engine.to_markup(&parse_fragment(case));
    }
}

#[quickcheck]
fn forward_conversion_is_total(input: String) -> bool {
    let engine = BBCodeEngine::new();
    let _ = engine.to_html(&input);
    let _ = engine.to_html_fragment(&input);
    true
}

#[quickcheck]
fn reverse_conversion_is_total(input: String) -> bool {
    let engine = BBCodeEngine::new();
    let _ = engine.to_markup(&parse_fragment(&input));
    let _ = engine.to_markup_fragment(&parse_fragment(&input), true);
    true
}

#[quickcheck]
fn round_trip_of_round_trip_is_stable(input: String) -> bool {
    // One full cycle normalizes; a second cycle must be a fixed point.
    let engine = BBCodeEngine::new();
    let once = engine.to_markup(&parse_fragment(&engine.to_html(&input)));
    let twice = engine.to_markup(&parse_fragment(&engine.to_html(&once)));
    once == twice
}
