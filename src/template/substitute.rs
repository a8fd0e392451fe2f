//! Placeholder substitution for widget templates

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::FieldValue;
use crate::widget::WidgetColors;

/// Template used when a definition's template cannot be found
pub const FALLBACK_TEMPLATE: &str = r#"
        <div class="widget">
            <div class="widget-content">
                {{content}}
            </div>
        </div>"#;

/// Any `{{...}}` token left after substitution
static LEFTOVER_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^}]+\}\}").expect("placeholder pattern is valid"));

/// Escape `& < > " '` for use in markup text or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the literal placeholder token for a name
pub fn placeholder(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// Replace `{{name}}` with the escaped value, one field at a time in field order
pub fn substitute_fields(template: &str, fields: &[FieldValue]) -> String {
    fields.iter().fold(template.to_string(), |acc, field| {
        acc.replace(&placeholder(&field.name), &escape_html(&field.value))
    })
}

/// Replace the four `{{color_*}}` placeholders verbatim
pub fn apply_palette(template: &str, colors: &WidgetColors) -> String {
    template
        .replace("{{color_primary}}", &colors.primary)
        .replace("{{color_background}}", &colors.background)
        .replace("{{color_text}}", &colors.text)
        .replace("{{color_accent}}", &colors.accent)
}

/// Remove every placeholder that is still unmatched
pub fn strip_unmatched(template: &str) -> String {
    LEFTOVER_PLACEHOLDER.replace_all(template, "").into_owned()
}

/// Fill a template: fields, then palette, then cleanup
///
/// Cleanup runs last so it only removes placeholders nothing matched.
pub fn fill(template: &str, fields: &[FieldValue], colors: &WidgetColors) -> String {
    let filled = substitute_fields(template, fields);
    let colored = apply_palette(&filled, colors);
    strip_unmatched(&colored)
}
