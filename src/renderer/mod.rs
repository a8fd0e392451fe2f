//! Document renderer: widget instances to one markup page
//!
//! This module takes a [`Document`] and produces markup by resolving each
//! instance through a registry snapshot, filling its template, and wrapping
//! the fragments in the page boilerplate.

pub mod config;
pub mod html;

pub use config::RenderConfig;
pub use html::HtmlBuilder;

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::model::{Document, DocumentWidget};
use crate::template::{fill, TemplateStore, FALLBACK_TEMPLATE};
use crate::widget::{Catalog, WidgetRegistry};

/// What happened to one widget instance during a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
    /// A fragment was produced
    Rendered {
        instance_id: String,
        definition_id: String,
        /// The template was missing and the built-in fallback was used
        fallback_template: bool,
    },
    /// The definition id matched nothing; no fragment was produced
    Omitted {
        instance_id: String,
        definition_id: String,
    },
}

impl WidgetOutcome {
    pub fn instance_id(&self) -> &str {
        match self {
            Self::Rendered { instance_id, .. } | Self::Omitted { instance_id, .. } => instance_id,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// A single rendered widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRender {
    /// Markup fragment; `None` when the instance was omitted
    pub fragment: Option<String>,
    pub outcome: WidgetOutcome,
}

/// Markup for a whole document plus per-instance outcomes in render order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub markup: String,
    pub outcomes: Vec<WidgetOutcome>,
}

impl RenderedDocument {
    /// Number of instances that produced a fragment
    pub fn rendered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_rendered()).count()
    }

    /// Instances dropped because their definition was unknown
    pub fn omitted(&self) -> impl Iterator<Item = &WidgetOutcome> {
        self.outcomes.iter().filter(|o| !o.is_rendered())
    }
}

/// Renders documents against a fixed registry snapshot and a template store
pub struct TemplateRenderer<'a> {
    catalog: Arc<Catalog>,
    store: &'a dyn TemplateStore,
    config: RenderConfig,
}

impl<'a> TemplateRenderer<'a> {
    /// Create a renderer over the registry's current contents
    ///
    /// Later reloads of the registry do not affect this renderer.
    pub fn new(registry: &WidgetRegistry, store: &'a dyn TemplateStore) -> Self {
        Self::from_catalog(registry.snapshot(), store)
    }

    /// Create a renderer over an explicit catalog snapshot
    pub fn from_catalog(catalog: Arc<Catalog>, store: &'a dyn TemplateStore) -> Self {
        Self {
            catalog,
            store,
            config: RenderConfig::default(),
        }
    }

    /// Set the output configuration
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Render a document, dating the footer with today's local date
    pub fn render(&self, document: &Document) -> RenderedDocument {
        self.render_at(document, Local::now().date_naive())
    }

    /// Render a document with an explicit generation date
    ///
    /// Output is a pure function of the document, the snapshot, the store
    /// contents and `generated_on`.
    pub fn render_at(&self, document: &Document, generated_on: NaiveDate) -> RenderedDocument {
        let mut ordered: Vec<&DocumentWidget> = document.widgets.iter().collect();
        // Stable: equal orders keep their position in the document
        ordered.sort_by_key(|w| w.order);

        let mut builder = HtmlBuilder::new(self.config.clone(), &document.title, &document.subtitle);
        let mut outcomes = Vec::with_capacity(ordered.len());

        for widget in ordered {
            let WidgetRender { fragment, outcome } = self.render_widget(widget);
            if let Some(fragment) = fragment {
                builder.add_fragment(fragment);
            }
            outcomes.push(outcome);
        }

        tracing::debug!(
            "rendered document '{}': {} of {} widgets",
            document.title,
            outcomes.iter().filter(|o| o.is_rendered()).count(),
            outcomes.len()
        );

        RenderedDocument {
            markup: builder.finish(generated_on),
            outcomes,
        }
    }

    /// Render one widget instance to a fragment
    pub fn render_widget(&self, widget: &DocumentWidget) -> WidgetRender {
        let Some(definition) = self.catalog.get(&widget.widget_definition_id) else {
            tracing::warn!(
                "widget '{}' references unknown definition '{}'; omitted",
                widget.id,
                widget.widget_definition_id
            );
            return WidgetRender {
                fragment: None,
                outcome: WidgetOutcome::Omitted {
                    instance_id: widget.id.clone(),
                    definition_id: widget.widget_definition_id.clone(),
                },
            };
        };

        let (template, fallback_template) = match self.store.template_text(&definition.template) {
            Some(text) => (text, false),
            None => {
                tracing::debug!(
                    "template '{}' for widget '{}' not found; using fallback",
                    definition.template,
                    definition.id
                );
                (FALLBACK_TEMPLATE.to_string(), true)
            }
        };

        WidgetRender {
            fragment: Some(fill(&template, &widget.fields, &definition.colors)),
            outcome: WidgetOutcome::Rendered {
                instance_id: widget.id.clone(),
                definition_id: definition.id.clone(),
                fallback_template,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MemoryTemplateStore;
    use crate::widget::WidgetDefinition;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn fixture() -> (WidgetRegistry, MemoryTemplateStore) {
        let registry = WidgetRegistry::from_definitions([
            WidgetDefinition::new("note", "Note", "note.html"),
            WidgetDefinition::new("bare", "Bare", "missing.html"),
        ]);
        let store = MemoryTemplateStore::new().with_template("note.html", "<p>[{{text}}]</p>");
        (registry, store)
    }

    #[test]
    fn test_render_widget_fills_template() {
        let (registry, store) = fixture();
        let renderer = TemplateRenderer::new(&registry, &store);
        let widget = DocumentWidget::new("note", 0).with_field("text", "a & b");
        let result = renderer.render_widget(&widget);
        assert_eq!(result.fragment.as_deref(), Some("<p>[a &amp; b]</p>"));
        assert!(matches!(
            result.outcome,
            WidgetOutcome::Rendered { fallback_template: false, .. }
        ));
    }

    #[test]
    fn test_missing_template_uses_fallback() {
        let (registry, store) = fixture();
        let renderer = TemplateRenderer::new(&registry, &store);
        let widget = DocumentWidget::new("bare", 0).with_field("content", "Hello");
        let result = renderer.render_widget(&widget);
        let fragment = result.fragment.unwrap();
        assert!(fragment.contains(r#"<div class="widget-content">"#));
        assert!(fragment.contains("Hello"));
        assert!(matches!(
            result.outcome,
            WidgetOutcome::Rendered { fallback_template: true, .. }
        ));
    }

    #[test]
    fn test_unknown_definition_is_omitted() {
        let (registry, store) = fixture();
        let renderer = TemplateRenderer::new(&registry, &store);
        let mut doc = Document::new("T");
        doc.widgets.push(DocumentWidget::new("ghost", 0));

        let rendered = renderer.render_at(&doc, date());
        assert_eq!(rendered.rendered_count(), 0);
        assert_eq!(rendered.omitted().count(), 1);
        assert!(rendered.markup.contains("</html>"));
    }

    #[test]
    fn test_renderer_keeps_its_snapshot() {
        let (registry, store) = fixture();
        let renderer = TemplateRenderer::new(&registry, &store);
        registry.remove("note");

        let widget = DocumentWidget::new("note", 0);
        assert!(renderer.render_widget(&widget).outcome.is_rendered());
    }
}
