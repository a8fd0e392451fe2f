//! Widget definition records as loaded from definition files

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors that can occur when reading a single definition file
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File could not be read
    #[error("error reading definition file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON
    #[error("invalid widget definition JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid TOML
    #[error("invalid widget definition TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Definition parsed but carries no id
    #[error("widget definition has an empty id")]
    MissingId,

    /// File extension is not a known definition format
    #[error("unsupported definition file: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Directory entry could not be visited during a scan
    #[error("error scanning {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Id cannot be used as a file name
    #[error("widget id cannot be used as a file name: {id}")]
    InvalidId { id: String },

    /// Definition could not be written
    #[error("error writing definition file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Enum value as written in a definition file: a name in any casing, or an ordinal
#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRepr {
    Name(String),
    Ordinal(u64),
}

/// The user's proficiency level; definitions may restrict themselves to some modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    Beginner,
    Intermediate,
    Expert,
}

const USER_MODES: [UserMode; 3] = [UserMode::Beginner, UserMode::Intermediate, UserMode::Expert];

/// Error returned when parsing an unknown mode name
#[derive(Debug, Error)]
#[error("unknown user mode '{0}' (expected beginner, intermediate or expert)")]
pub struct UnknownMode(pub String);

impl FromStr for UserMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(UserMode::Beginner),
            "intermediate" => Ok(UserMode::Intermediate),
            "expert" => Ok(UserMode::Expert),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for UserMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match EnumRepr::deserialize(deserializer)? {
            EnumRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            EnumRepr::Ordinal(n) => usize::try_from(n)
                .ok()
                .and_then(|i| USER_MODES.get(i).copied())
                .ok_or_else(|| serde::de::Error::custom(format!("unknown user mode ordinal {}", n))),
        }
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserMode::Beginner => "beginner",
            UserMode::Intermediate => "intermediate",
            UserMode::Expert => "expert",
        };
        f.write_str(name)
    }
}

/// Input type of a widget field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Multiline,
    Date,
    DateTime,
    Number,
    Boolean,
    Dropdown,
    Email,
    Url,
}

const FIELD_TYPES: [FieldType; 9] = [
    FieldType::String,
    FieldType::Multiline,
    FieldType::Date,
    FieldType::DateTime,
    FieldType::Number,
    FieldType::Boolean,
    FieldType::Dropdown,
    FieldType::Email,
    FieldType::Url,
];

/// Error returned when parsing an unknown field type name
#[derive(Debug, Error)]
#[error("unknown field type '{0}'")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "multiline" => Ok(FieldType::Multiline),
            "date" => Ok(FieldType::Date),
            "datetime" => Ok(FieldType::DateTime),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "dropdown" => Ok(FieldType::Dropdown),
            "email" => Ok(FieldType::Email),
            "url" => Ok(FieldType::Url),
            _ => Err(UnknownFieldType(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match EnumRepr::deserialize(deserializer)? {
            EnumRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            EnumRepr::Ordinal(n) => usize::try_from(n)
                .ok()
                .and_then(|i| FIELD_TYPES.get(i).copied())
                .ok_or_else(|| serde::de::Error::custom(format!("unknown field type ordinal {}", n))),
        }
    }
}

/// A field within a widget definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Hint shown in an empty input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(
        default,
        rename = "validation",
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

fn default_required() -> bool {
    true
}

impl WidgetField {
    /// Create a required field with no default
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: true,
            default_value: None,
            placeholder: None,
            options: None,
            validation_pattern: None,
            help_text: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Mark the field as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set dropdown options
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

pub const DEFAULT_PRIMARY: &str = "#001489";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_TEXT: &str = "#333333";
pub const DEFAULT_ACCENT: &str = "#FFCD00";

/// Four-slot color palette substituted into `{{color_*}}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetColors {
    pub primary: String,
    pub background: String,
    pub text: String,
    pub accent: String,
}

impl Default for WidgetColors {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            text: DEFAULT_TEXT.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

fn default_category() -> String {
    "General".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// A reusable widget: template reference, field schema and color palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDefinition {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Template reference handed to the template store
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub fields: Vec<WidgetField>,
    /// `None` or empty means the widget is usable in every mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_modes: Option<Vec<UserMode>>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub colors: WidgetColors,
}

impl WidgetDefinition {
    /// Create a definition with defaults for everything but id, name and template
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            category: default_category(),
            description: None,
            icon: None,
            template: template.into(),
            fields: Vec::new(),
            allowed_modes: None,
            version: default_version(),
            colors: WidgetColors::default(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Append a field
    pub fn with_field(mut self, field: WidgetField) -> Self {
        self.fields.push(field);
        self
    }

    /// Restrict the definition to the given modes
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = UserMode>) -> Self {
        self.allowed_modes = Some(modes.into_iter().collect());
        self
    }

    /// Replace the color palette
    pub fn with_colors(mut self, colors: WidgetColors) -> Self {
        self.colors = colors;
        self
    }

    /// Check whether the definition may be used in `mode`
    pub fn allows_mode(&self, mode: UserMode) -> bool {
        match &self.allowed_modes {
            None => true,
            Some(modes) => modes.is_empty() || modes.contains(&mode),
        }
    }

    /// Get a field by id
    pub fn field(&self, id: &str) -> Option<&WidgetField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Parse a definition from JSON text
    pub fn from_json(content: &str) -> Result<Self, DefinitionError> {
        let def: Self = serde_json::from_str(content)?;
        def.validated()
    }

    /// Parse a definition from TOML text
    pub fn from_toml(content: &str) -> Result<Self, DefinitionError> {
        let def: Self = toml::from_str(content)?;
        def.validated()
    }

    /// Load a definition file, picking the format from its extension
    pub fn from_file(path: &Path) -> Result<Self, DefinitionError> {
        let format = DefinitionFormat::from_path(path).ok_or_else(|| {
            DefinitionError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
        })?;
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match format {
            DefinitionFormat::Json => Self::from_json(&content),
            DefinitionFormat::Toml => Self::from_toml(&content),
        }
    }

    /// Pretty JSON in the definition file schema
    pub fn to_json(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the definition to `<dir>/<id>.json`, creating `dir` if needed
    pub fn save(&self, dir: &Path) -> Result<PathBuf, DefinitionError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(DefinitionError::MissingId);
        }
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(DefinitionError::InvalidId { id: id.to_string() });
        }

        let json = self.to_json()?;
        std::fs::create_dir_all(dir).map_err(|source| DefinitionError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.json", id));
        std::fs::write(&path, json).map_err(|source| DefinitionError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn validated(self) -> Result<Self, DefinitionError> {
        if self.id.trim().is_empty() {
            return Err(DefinitionError::MissingId);
        }
        Ok(self)
    }
}

/// On-disk formats accepted for definition files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Toml,
}

impl DefinitionFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}
