//! Integration tests for markup conversion and style parsing

use pretty_assertions::assert_eq;
use rstest::rstest;

use widget_press::{
    convert, convert_with, parse_style, ColorValue, ConversionStatus, Edges, MarkupError,
    NodeKind, ParserConfig, StyleRecord, Stylesheet,
};

#[test]
fn test_style_round_trip() {
    let style = parse_style("background: #112233; padding: 12px; border-radius: 4px;");
    assert_eq!(style.background, Some(ColorValue::Hex("#112233".to_string())));
    assert_eq!(style.padding, Some(Edges::uniform(12)));
    assert_eq!(style.corner_radius, Some(4));
    assert_eq!(style.margin, Edges::uniform(8));
    assert_eq!(style.border_color, None);
    assert_eq!(style.border_thickness, None);
}

#[test]
fn test_fallback_parsing() {
    let conversion = convert("Line one<br>Line two<br><br>");
    let root = &conversion.root;
    assert_eq!(root.kind, NodeKind::Container);
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].text.as_deref(), Some("Line one"));
    assert_eq!(root.children[1].text.as_deref(), Some("Line two"));
    assert!(root.children.iter().all(|c| c.kind == NodeKind::Text));
}

#[rstest]
#[case("")]
#[case("<div>")]
#[case("</div></div>")]
#[case("<<<>>>")]
#[case("<div style=\"border: ;;;\"><h1></h1><strong></div>")]
#[case("{{#if}}{{/if}}{{}}{{")]
#[case("<h1>no container</h1><br><strong>x</strong>")]
fn test_root_is_always_a_container(#[case] markup: &str) {
    let conversion = convert(markup);
    assert_eq!(conversion.root.kind, NodeKind::Container);
    assert!(!conversion.is_degraded());
}

#[test]
fn test_widget_template_preview() {
    let template = r#"
        <div style="background: rgba(186, 12, 47, 0.08); border-left: 4px solid #BA0C2F; padding: 16px; margin: 12px 0px; border-radius: 6px;">
            <h2>{{title}}</h2>
            <strong>When:</strong> {{date}}
            {{#if location}}<strong>Where:</strong> {{location}}{{/if}}
            <p>Please RSVP by Friday &mdash; thanks!</p>
        </div>
    "#;
    let conversion = convert(template);
    assert_eq!(conversion.status, ConversionStatus::Containers(1));

    let card = &conversion.root.children[0];
    assert_eq!(
        card.style,
        Some(StyleRecord {
            background: Some(ColorValue::Hex("#FFF3CD".to_string())),
            border_color: Some(ColorValue::Hex("#BA0C2F".to_string())),
            border_thickness: Some(Edges::left_only(3)),
            padding: Some(Edges::uniform(16)),
            margin: Edges::symmetric(12, 0),
            corner_radius: Some(6),
        })
    );

    let kinds: Vec<_> = card.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Heading, NodeKind::Emphasis, NodeKind::Text]
    );
    assert_eq!(
        card.leaf_texts(),
        vec!["Sample Text", "When:", "Please RSVP by Friday \u{2014} thanks!"]
    );
}

#[test]
fn test_bold_text_inside_heading() {
    let conversion =
        convert("<div><h2>Meeting <strong>Tonight</strong></h2><p>Details follow here</p></div>");
    let card = &conversion.root.children[0];
    let kinds: Vec<_> = card.children.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Heading, NodeKind::Emphasis, NodeKind::Text]);
    assert_eq!(card.children[1].text.as_deref(), Some("Tonight"));
}

#[test]
fn test_partial_markup_converts_quickly() {
    let markup = "<div>x".repeat(8_500);
    let start = std::time::Instant::now();
    let conversion = convert(&markup);
    assert!(start.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(conversion.status, ConversionStatus::Lines(1));
    assert_eq!(conversion.root.children[0].text.as_deref(), Some("x".repeat(8_500).as_str()));
}

#[test]
fn test_strict_conversion_reports_unclosed_container() {
    let markup = "<div>ok</div>\n<div style=\"padding: 4px\">never closed";
    let config = ParserConfig::new().with_strict(true);
    let conversion = convert_with(markup, &config, &Stylesheet::default());
    let ConversionStatus::Degraded(err) = &conversion.status else {
        panic!("Expected degraded conversion, got {:?}", conversion.status);
    };
    assert!(matches!(err, MarkupError::Syntax { .. }));
    let report = err.format(markup, "notice.html");
    assert!(report.contains("notice.html"));
    assert!(report.contains("Unexpected"));
}

#[test]
fn test_custom_filler_and_palette() {
    let palette = Stylesheet::from_str(
        r##"
[colors]
heading = "#000080"
"##,
    )
    .unwrap();
    let config = ParserConfig::new().with_filler("…");
    let conversion = convert_with("<div><h1>{{title}}</h1></div>", &config, &palette);

    let heading = &conversion.root.children[0].children[0];
    assert_eq!(heading.text.as_deref(), Some("…"));
    assert_eq!(
        heading.text_style.as_ref().map(|s| s.color.clone()),
        Some(ColorValue::Hex("#000080".to_string()))
    );
}

#[test]
fn test_degraded_conversion_keeps_a_displayable_tree() {
    let config = ParserConfig::new().with_max_input_bytes(4);
    let conversion = convert_with("<div>abc</div>", &config, &Stylesheet::default());
    assert!(conversion.is_degraded());
    assert_eq!(conversion.root.kind, NodeKind::Container);
    assert_eq!(conversion.root.children.len(), 1);
    assert!(conversion.root.children[0].is_error);
}
