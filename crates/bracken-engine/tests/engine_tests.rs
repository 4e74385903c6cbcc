//! Integration tests for the engine facade and the registry admin surface.

use bracken_bbcode::{HtmlRender, MarkupRender, RegistryError, TagDefinition};
use bracken_engine::BBCodeEngine;

/// Helper: a trivial custom inline tag.
fn mono_definition() -> TagDefinition {
    TagDefinition {
        to_html: HtmlRender::Template("<tt>{0}</tt>".to_string()),
        to_markup: MarkupRender::Template("[mono]{0}[/mono]".to_string()),
        ..TagDefinition::default()
    }
}

#[test]
fn test_custom_tag_registration() {
    let mut engine = BBCodeEngine::new();
    engine.set_tag("mono", mono_definition()).unwrap();
    assert_eq!(
        engine.to_html_fragment("[mono]x[/mono]"),
        "<tt>x</tt>"
    );
}

#[test]
fn test_template_attribute_placeholders() {
    let mut engine = BBCodeEngine::new();
    let definition = TagDefinition {
        to_html: HtmlRender::Template("<a name=\"{default}\">{0}</a>".to_string()),
        ..TagDefinition::default()
    };
    engine.set_tag("anchor", definition).unwrap();
    // Attribute substitutions are entity-escaped.
    assert_eq!(
        engine.to_html_fragment("[anchor=a&b]x[/anchor]"),
        "<a name=\"a&amp;b\">x</a>"
    );
}

#[test]
fn test_registry_seals_on_first_conversion() {
    let mut engine = BBCodeEngine::new();
    let _ = engine.to_html("seal it");
    assert_eq!(
        engine.set_tag("mono", mono_definition()),
        Err(RegistryError::Sealed)
    );
    assert!(matches!(
        engine.remove_tag("b"),
        Err(RegistryError::Sealed)
    ));
    assert_eq!(
        engine.rename_tag("b", "bold"),
        Err(RegistryError::Sealed)
    );
    // Reads keep working after sealing.
    assert!(engine.tag("b").is_some());
}

#[test]
fn test_rename_tag() {
    let mut engine = BBCodeEngine::new();
    engine.rename_tag("b", "bold").unwrap();
    assert!(engine.tag("b").is_none());
    assert_eq!(engine.to_html_fragment("[bold]x[/bold]"), "<strong>x</strong>");
    // The old spelling is literal text now.
    assert_eq!(engine.to_html_fragment("[b]x[/b]"), "[b]x[/b]");
}

#[test]
fn test_remove_tag() {
    let mut engine = BBCodeEngine::new();
    let _ = engine.remove_tag("b").unwrap();
    assert_eq!(engine.to_html_fragment("[b]x[/b]"), "[b]x[/b]");
}

#[test]
fn test_unknown_tag_admin_errors() {
    let mut engine = BBCodeEngine::new();
    assert_eq!(
        engine.rename_tag("nope", "still-nope"),
        Err(RegistryError::UnknownTag("nope".to_string()))
    );
    assert!(matches!(
        engine.remove_tag("nope"),
        Err(RegistryError::UnknownTag(_))
    ));
}

#[test]
fn test_missing_lookup_is_absence_not_error() {
    let engine = BBCodeEngine::new();
    assert!(engine.tag("nope").is_none());
}

#[test]
fn test_options_deserialize_camel_case() {
    use bracken_bbcode::{ConversionOptions, QuoteMode};

    let options: ConversionOptions = serde_json::from_str(
        r#"{"removeEmptyTags": false, "quoteType": "always", "bbcodeTrim": true}"#,
    )
    .unwrap();
    assert!(!options.remove_empty_tags);
    assert_eq!(options.quote_type, QuoteMode::Always);
    assert!(options.bbcode_trim);
    // Unmentioned fields keep their defaults.
    assert!(options.fix_invalid_nesting);
}
