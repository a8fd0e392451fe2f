//! Page boilerplate around rendered widget fragments

use std::fmt::Write;

use chrono::NaiveDate;

use crate::template::escape_html;

use super::RenderConfig;

const BODY_STYLE: &str = "font-family: 'Ubuntu', Arial, sans-serif; background: linear-gradient(135deg, #001489 0%, #0056d2 100%); color: #333; line-height: 1.6; padding: 20px; min-height: 100vh; margin: 0;";
const PAGE_STYLE: &str = "max-width: 1000px; margin: 0 auto; background: #fff; box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3); border-radius: 12px; overflow: hidden;";
const HEADER_STYLE: &str = "background: linear-gradient(135deg, #001489 0%, #003ab8 100%); color: #fff; padding: 50px 40px; text-align: center; border-top: 6px solid #FFCD00;";
const TITLE_STYLE: &str = "font-size: 2.4em; margin: 0 0 10px 0; font-weight: 800; text-transform: uppercase; letter-spacing: 2px; color: #fff;";
const SUBTITLE_STYLE: &str = "font-size: 1.2em; font-weight: 500; margin: 0; color: #FFCD00;";
const CONTENT_STYLE: &str = "padding: 40px;";
const FOOTER_STYLE: &str = "background: #f5f5f5; padding: 30px; text-align: center; font-size: 1em; color: #666; border-top: 6px solid #BA0C2F;";

const BASE_STYLES: &str = r#".widget { margin-bottom: 30px; padding: 20px; border-left: 4px solid #3498db; background-color: #f9f9f9; }
.widget-title { font-size: 1.5em; color: #2c3e50; margin-bottom: 15px; }
.alert-widget { border-left-color: #e74c3c; background-color: #fef5f5; }
.info-widget { border-left-color: #3498db; background-color: #f0f8ff; }
.warning-widget { border-left-color: #f39c12; background-color: #fffbf0; }"#;

/// Build the page incrementally
pub struct HtmlBuilder {
    config: RenderConfig,
    title: String,
    subtitle: String,
    fragments: Vec<String>,
    lines: Vec<String>,
}

impl HtmlBuilder {
    /// Create a builder for a page with the given title and subtitle
    pub fn new(config: RenderConfig, title: &str, subtitle: &str) -> Self {
        Self {
            config,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            fragments: vec![],
            lines: vec![],
        }
    }

    /// Add a rendered widget fragment
    pub fn add_fragment(&mut self, fragment: String) {
        self.fragments.push(fragment);
    }

    fn line(&mut self, indent: usize, text: impl AsRef<str>) {
        let pad = if self.config.pretty_print {
            "    ".repeat(indent)
        } else {
            String::new()
        };
        self.lines.push(format!("{}{}", pad, text.as_ref()));
    }

    fn newline(&self) -> &'static str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.config.date_format)).is_err() {
            tracing::warn!("invalid date format '{}'", self.config.date_format);
            out = date.format("%Y-%m-%d").to_string();
        }
        out
    }

    /// Assemble the final markup
    pub fn finish(mut self, generated_on: NaiveDate) -> String {
        let fragments = std::mem::take(&mut self.fragments);
        if !self.config.standalone {
            self.line(0, format!(r#"<div style="{}">"#, CONTENT_STYLE));
            for fragment in fragments {
                self.lines.push(fragment);
            }
            self.line(0, "</div>");
            return self.lines.join(self.newline());
        }

        let title = escape_html(&self.title);
        let subtitle = escape_html(&self.subtitle);

        self.line(0, "<!DOCTYPE html>");
        self.line(0, r#"<html lang="en">"#);
        self.line(0, "<head>");
        self.line(1, r#"<meta charset="UTF-8">"#);
        self.line(
            1,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#,
        );
        self.line(1, format!("<title>{}</title>", title));
        if let Some(url) = self.config.font_url.clone() {
            self.line(1, format!(r#"<link href="{}" rel="stylesheet">"#, escape_html(&url)));
        }
        self.line(1, "<style>");
        for rule in BASE_STYLES.lines() {
            self.line(2, rule);
        }
        self.line(1, "</style>");
        self.line(0, "</head>");
        self.line(0, format!(r#"<body style="{}">"#, BODY_STYLE));
        self.line(1, format!(r#"<div style="{}">"#, PAGE_STYLE));

        self.line(2, format!(r#"<div style="{}">"#, HEADER_STYLE));
        self.line(3, format!(r#"<h1 style="{}">{}</h1>"#, TITLE_STYLE, title));
        self.line(3, format!(r#"<p style="{}">{}</p>"#, SUBTITLE_STYLE, subtitle));
        self.line(2, "</div>");

        self.line(2, format!(r#"<div style="{}">"#, CONTENT_STYLE));
        for fragment in fragments {
            self.lines.push(fragment);
        }
        self.line(2, "</div>");

        let generated = self.format_date(generated_on);
        self.line(2, format!(r#"<div style="{}">"#, FOOTER_STYLE));
        self.line(3, format!(r#"<p style="margin: 0;">Generated on {}</p>"#, generated));
        self.line(2, "</div>");

        self.line(1, "</div>");
        self.line(0, "</body>");
        self.line(0, "</html>");

        self.lines.join(self.newline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[test]
    fn test_standalone_page() {
        let mut builder = HtmlBuilder::new(RenderConfig::default(), "Q1 <Update>", "Squadron");
        builder.add_fragment("<div>one</div>".to_string());
        let html = builder.finish(date());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Q1 &lt;Update&gt;</title>"));
        assert!(html.contains("<div>one</div>"));
        assert!(html.contains("Generated on January 15, 2026"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_fragment_only_page() {
        let config = RenderConfig::new().with_standalone(false).with_pretty_print(false);
        let mut builder = HtmlBuilder::new(config, "T", "S");
        builder.add_fragment("<p>a</p>".to_string());
        builder.add_fragment("<p>b</p>".to_string());
        let html = builder.finish(date());
        insta::assert_snapshot!(html, @r#"<div style="padding: 40px;"><p>a</p><p>b</p></div>"#);
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let config = RenderConfig::new().with_date_format("%Q");
        let html = HtmlBuilder::new(config, "T", "S").finish(date());
        assert!(html.contains("Generated on 2026-01-15"));
    }
}
