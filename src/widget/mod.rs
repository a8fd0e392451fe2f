//! Widget definitions and the registry that holds them
//!
//! A widget definition names a template, lists the fields a user fills in,
//! and carries the color palette substituted into `{{color_*}}` placeholders.
//! Definitions are loaded from `*.json` or `*.toml` files:
//!
//! ```text
//! {
//!   "id": "meeting",
//!   "displayName": "Meeting",
//!   "category": "Events",
//!   "template": "meeting.html",
//!   "fields": [{ "id": "title", "type": "string", "label": "Title" }]
//! }
//! ```

mod definition;
mod registry;

pub use definition::{
    DefinitionError, DefinitionFormat, FieldType, UnknownFieldType, UnknownMode, UserMode,
    WidgetColors,
    WidgetDefinition, WidgetField, DEFAULT_ACCENT, DEFAULT_BACKGROUND, DEFAULT_PRIMARY,
    DEFAULT_TEXT,
};
pub use registry::{Catalog, LoadFailure, LoadReport, RegistryError, WidgetRegistry};
