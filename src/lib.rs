//! Widget Press - assemble documents from reusable widget blocks
//!
//! This library renders a [`Document`] of widget instances to a markup page
//! through a [`WidgetRegistry`] and a [`TemplateStore`], and converts markup
//! back into a styled [`Node`] tree for previews.
//!
//! # Example
//!
//! ```rust
//! use widget_press::{
//!     render_preview, Document, MemoryTemplateStore, PipelineConfig, WidgetDefinition,
//!     WidgetRegistry,
//! };
//!
//! let registry = WidgetRegistry::from_definitions([WidgetDefinition::new(
//!     "note",
//!     "Note",
//!     "note.html",
//! )]);
//! let store = MemoryTemplateStore::new()
//!     .with_template("note.html", r#"<div style="padding: 8px">{{message}}</div>"#);
//!
//! let mut document = Document::new("Weekly Update");
//! let note = registry.get("note").unwrap();
//! document.add_widget(&note).set_field_value("message", "Hello & welcome");
//!
//! let preview = render_preview(&document, &registry, &store, &PipelineConfig::default());
//! assert!(preview.rendered.markup.contains("Hello &amp; welcome"));
//! assert!(preview.conversion.root.leaf_texts().contains(&"Hello & welcome"));
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod preview;
pub mod renderer;
pub mod style;
pub mod stylesheet;
pub mod template;
pub mod widget;

pub use error::MarkupError;
pub use model::{Document, DocumentWidget, FieldValue};
pub use parser::{
    convert, convert_with, Conversion, ConversionStatus, Node, NodeKind, ParserConfig, TextStyle,
};
pub use preview::{Completion, PreviewCoordinator, PreviewTicket};
pub use renderer::{
    RenderConfig, RenderedDocument, TemplateRenderer, WidgetOutcome, WidgetRender,
};
pub use style::{parse_style, parse_style_with, ColorValue, Edges, StyleRecord};
pub use stylesheet::{Stylesheet, StylesheetError};
pub use template::{FsTemplateStore, MemoryTemplateStore, StoreError, TemplateStore};
pub use widget::{
    Catalog, DefinitionError, LoadReport, RegistryError, UserMode, WidgetDefinition,
    WidgetRegistry,
};

use chrono::NaiveDate;

/// Configuration for the complete render-and-preview pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Markup output configuration
    pub render: RenderConfig,
    /// Markup conversion configuration
    pub parser: ParserConfig,
    /// Palette for node styling
    pub stylesheet: Stylesheet,
}

impl PipelineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the markup output configuration
    pub fn with_render(mut self, config: RenderConfig) -> Self {
        self.render = config;
        self
    }

    /// Set the conversion configuration
    pub fn with_parser(mut self, config: ParserConfig) -> Self {
        self.parser = config;
        self
    }

    /// Set the palette
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }
}

/// Rendered markup together with its preview tree
#[derive(Debug, Clone)]
pub struct Preview {
    pub rendered: RenderedDocument,
    pub conversion: Conversion,
}

/// Render a document and convert the result for display
///
/// Never fails: missing definitions are reported in
/// `rendered.outcomes`, conversion problems in `conversion.status`.
pub fn render_preview(
    document: &Document,
    registry: &WidgetRegistry,
    store: &dyn TemplateStore,
    config: &PipelineConfig,
) -> Preview {
    let renderer = TemplateRenderer::new(registry, store).with_config(config.render.clone());
    preview_rendered(renderer.render(document), config)
}

/// Like [`render_preview`], with a fixed generation date
pub fn render_preview_at(
    document: &Document,
    registry: &WidgetRegistry,
    store: &dyn TemplateStore,
    config: &PipelineConfig,
    generated_on: NaiveDate,
) -> Preview {
    let renderer = TemplateRenderer::new(registry, store).with_config(config.render.clone());
    preview_rendered(renderer.render_at(document, generated_on), config)
}

/// Preview a single widget instance, without page boilerplate
///
/// Returns `None` when the instance's definition is unknown.
pub fn preview_widget(
    widget: &DocumentWidget,
    registry: &WidgetRegistry,
    store: &dyn TemplateStore,
    config: &PipelineConfig,
) -> Option<Conversion> {
    let renderer = TemplateRenderer::new(registry, store);
    let fragment = renderer.render_widget(widget).fragment?;
    Some(convert_with(&fragment, &config.parser, &config.stylesheet))
}

fn preview_rendered(rendered: RenderedDocument, config: &PipelineConfig) -> Preview {
    let conversion = convert_with(&rendered.markup, &config.parser, &config.stylesheet);
    Preview {
        rendered,
        conversion,
    }
}
