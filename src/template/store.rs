//! Template store: raw template markup looked up by reference

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

/// Extension used for templates written by id
pub const TEMPLATE_EXTENSION: &str = "html";

/// Errors that can occur when writing or deleting templates
#[derive(Debug, Error)]
pub enum StoreError {
    /// Id or reference would resolve outside the store
    #[error("invalid template id: {id}")]
    InvalidId { id: String },

    /// Error touching the backing file
    #[error("error accessing template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Key → text lookup for template markup
///
/// Lookups never fail: anything that cannot be read is reported as absent and
/// the renderer substitutes its fallback template.
pub trait TemplateStore: Send + Sync {
    /// Raw template text for a definition's template reference
    fn template_text(&self, reference: &str) -> Option<String>;

    /// Store template text under a widget id
    fn put_template_text(&self, id: &str, text: &str) -> Result<(), StoreError>;

    /// Delete the template stored under a widget id; returns whether one existed
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Check that a reference stays inside the store root
fn is_contained(reference: &str) -> bool {
    !reference.is_empty()
        && Path::new(reference)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn file_name_for(id: &str) -> Result<String, StoreError> {
    if !is_contained(id) || id.contains(['/', '\\']) {
        return Err(StoreError::InvalidId { id: id.to_string() });
    }
    Ok(format!("{}.{}", id, TEMPLATE_EXTENSION))
}

/// Templates stored as files under a base directory
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    base_path: PathBuf,
}

impl FsTemplateStore {
    /// Create a store rooted at `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the base directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a template reference relative to the base directory
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        self.base_path.join(reference)
    }
}

impl TemplateStore for FsTemplateStore {
    fn template_text(&self, reference: &str) -> Option<String> {
        if !is_contained(reference) {
            tracing::warn!("refusing template reference outside store: {}", reference);
            return None;
        }
        let path = self.resolve_path(reference);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("template {} not found", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("error reading template {}: {}", path.display(), e);
                None
            }
        }
    }

    fn put_template_text(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let path = self.base_path.join(file_name_for(id)?);
        std::fs::create_dir_all(&self.base_path).map_err(|source| StoreError::Io {
            path: self.base_path.clone(),
            source,
        })?;
        std::fs::write(&path, text).map_err(|source| StoreError::Io { path, source })
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.base_path.join(file_name_for(id)?);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// In-memory store, keyed by reference
///
/// `put_template_text(id, ..)` stores under `<id>.html`, matching the file
/// layout of [`FsTemplateStore`].
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<String, String>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template under an explicit reference, builder style
    pub fn with_template(self, reference: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.into(), text.into());
        self
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn template_text(&self, reference: &str) -> Option<String> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned()
    }

    fn put_template_text(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let key = file_name_for(id)?;
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, text.to_string());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let key = file_name_for(id)?;
        Ok(self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTemplateStore::new(dir.path().join("templates"));

        store.put_template_text("alert", "<div>{{title}}</div>").unwrap();
        assert_eq!(
            store.template_text("alert.html").as_deref(),
            Some("<div>{{title}}</div>")
        );
        assert!(store.delete("alert").unwrap());
        assert!(!store.delete("alert").unwrap());
        assert!(store.template_text("alert.html").is_none());
    }

    #[test]
    fn test_fs_store_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTemplateStore::new(dir.path());
        assert!(store.template_text("../secret.html").is_none());
        assert!(store.template_text("").is_none());
        assert!(matches!(
            store.put_template_text("../x", ""),
            Err(StoreError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTemplateStore::new().with_template("info.html", "<p>{{content}}</p>");
        assert!(store.template_text("info.html").is_some());
        store.put_template_text("memo", "x").unwrap();
        assert_eq!(store.template_text("memo.html").as_deref(), Some("x"));
        assert!(store.delete("memo").unwrap());
    }
}
