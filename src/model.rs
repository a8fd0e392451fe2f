//! Document model handed to the pipeline by its caller
//!
//! A [`Document`] is an ordered list of [`DocumentWidget`] instances, each
//! pointing at a widget definition by id and carrying the field values typed
//! in by the user. The pipeline only reads these values; loading and saving
//! documents belongs to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::widget::WidgetDefinition;

/// Default document title
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Default document subtitle shown under the title
pub const DEFAULT_SUBTITLE: &str = "Civil Air Patrol - Heartland Composite Squadron";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_subtitle() -> String {
    DEFAULT_SUBTITLE.to_string()
}

/// A complete announcement document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub widgets: Vec<DocumentWidget>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Create an empty document with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            subtitle: default_subtitle(),
            created_at: now,
            modified_at: now,
            widgets: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Set the subtitle
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Append an instance of `definition` after the existing widgets
    ///
    /// The new instance gets `order = widgets.len()` and one field value per
    /// definition field, seeded from the field's default.
    pub fn add_widget(&mut self, definition: &WidgetDefinition) -> &mut DocumentWidget {
        let order = i32::try_from(self.widgets.len()).unwrap_or(i32::MAX);
        self.widgets
            .push(DocumentWidget::from_definition(definition, order));
        self.modified_at = Utc::now();
        let last = self.widgets.len() - 1;
        &mut self.widgets[last]
    }

    /// Remove the instance with `widget_id` and renumber the rest 0..n in
    /// their current render order
    pub fn remove_widget(&mut self, widget_id: &str) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.id != widget_id);
        if self.widgets.len() == before {
            return false;
        }
        self.renumber();
        true
    }

    /// Rewrite every `order` to its position in render order
    pub fn renumber(&mut self) {
        self.widgets.sort_by_key(|w| w.order);
        for (index, widget) in self.widgets.iter_mut().enumerate() {
            widget.order = i32::try_from(index).unwrap_or(i32::MAX);
        }
        self.modified_at = Utc::now();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

/// An instance of a widget definition placed in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWidget {
    #[serde(default = "new_id")]
    pub id: String,
    /// Id of the widget definition; resolved through the registry at render time
    #[serde(alias = "definitionId")]
    pub widget_definition_id: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl DocumentWidget {
    /// Create an instance with no field values
    pub fn new(widget_definition_id: impl Into<String>, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            widget_definition_id: widget_definition_id.into(),
            order,
            fields: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Create an instance seeded with the definition's default field values
    pub fn from_definition(definition: &WidgetDefinition, order: i32) -> Self {
        let mut widget = Self::new(definition.id.clone(), order);
        widget.fields = definition
            .fields
            .iter()
            .map(|f| FieldValue::new(f.id.clone(), f.default_value.clone().unwrap_or_default()))
            .collect();
        widget
    }

    /// Add a field value, builder style
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FieldValue::new(name, value));
        self
    }

    /// Value of the first field named `name`, or "" when absent
    pub fn field_value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    /// Overwrite the first field named `name`, appending it when missing
    pub fn set_field_value(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(FieldValue::new(name, value)),
        }
        self.modified_at = Utc::now();
    }
}

/// A named field value on a widget instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
