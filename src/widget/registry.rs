//! Widget registry for storing and retrieving widget definitions
//!
//! The registry owns an immutable [`Catalog`] behind an `Arc`. Every change
//! (reload, insert, remove) builds a replacement catalog off to the side and
//! swaps the pointer, so a reader holding a snapshot never observes a
//! half-populated map.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use thiserror::Error;
use walkdir::WalkDir;

use super::definition::{DefinitionError, DefinitionFormat, UserMode, WidgetDefinition};

/// Errors that abort a registry load as a whole
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The source path exists but is not a directory
    #[error("widget source is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

/// A definition file or directory entry that was skipped during a load
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: DefinitionError,
}

/// Outcome of [`WidgetRegistry::load_all`]
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Ids in load order; an id loaded twice appears twice
    pub loaded: Vec<String>,
    /// Files that failed to parse, and entries that could not be visited
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// Whether every definition file parsed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Immutable id → definition map; iteration follows insertion order
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    definitions: IndexMap<String, Arc<WidgetDefinition>>,
}

impl Catalog {
    /// Get a definition by id
    pub fn get(&self, id: &str) -> Option<&Arc<WidgetDefinition>> {
        self.definitions.get(id)
    }

    /// Check if a definition exists
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// All definitions in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<WidgetDefinition>> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions usable in `mode`
    pub fn filter_by_mode(&self, mode: UserMode) -> Vec<Arc<WidgetDefinition>> {
        self.iter()
            .filter(|def| def.allows_mode(mode))
            .cloned()
            .collect()
    }

    /// Definitions usable in `mode`, grouped by category
    ///
    /// Groups appear in the order their category is first encountered, and
    /// each group keeps registry order.
    pub fn group_by_category(&self, mode: UserMode) -> IndexMap<String, Vec<Arc<WidgetDefinition>>> {
        let mut groups: IndexMap<String, Vec<Arc<WidgetDefinition>>> = IndexMap::new();
        for def in self.filter_by_mode(mode) {
            groups.entry(def.category.clone()).or_default().push(def);
        }
        groups
    }

    /// Insert, replacing any definition with the same id (last wins)
    fn insert(&mut self, def: WidgetDefinition) {
        self.definitions.insert(def.id.clone(), Arc::new(def));
    }
}

/// Registry of widget definitions keyed by id
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    current: RwLock<Arc<Catalog>>,
}

impl WidgetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given definitions (last duplicate wins)
    pub fn from_definitions(definitions: impl IntoIterator<Item = WidgetDefinition>) -> Self {
        let mut catalog = Catalog::default();
        for def in definitions {
            catalog.insert(def);
        }
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Current immutable catalog
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn swap(&self, catalog: Catalog) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(catalog);
    }

    /// Rebuild the registry from every definition file under `dir`
    ///
    /// Files are visited recursively in file-name order, so when two files
    /// share an id the later one in that order wins. Symlinks are followed.
    /// A file that fails to parse, or an entry that cannot be visited, is
    /// logged and skipped. A missing directory yields an empty registry.
    pub fn load_all(&self, dir: &Path) -> Result<LoadReport, RegistryError> {
        let mut report = LoadReport::default();
        let mut catalog = Catalog::default();

        if !dir.exists() {
            tracing::debug!("widget directory {} does not exist", dir.display());
            self.swap(catalog);
            return Ok(report);
        }
        if !dir.is_dir() {
            return Err(RegistryError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source.path().unwrap_or(dir).to_path_buf();
                    tracing::warn!("skipping {}: {}", path.display(), source);
                    report.failures.push(LoadFailure {
                        path: path.clone(),
                        error: DefinitionError::Walk { path, source },
                    });
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || DefinitionFormat::from_path(path).is_none() {
                continue;
            }

            match WidgetDefinition::from_file(path) {
                Ok(def) => {
                    tracing::debug!("loaded widget '{}' from {}", def.id, path.display());
                    report.loaded.push(def.id.clone());
                    catalog.insert(def);
                }
                Err(error) => {
                    tracing::warn!("failed to load widget from {}: {}", path.display(), error);
                    report.failures.push(LoadFailure {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }

        self.swap(catalog);
        Ok(report)
    }

    /// Get a definition by id
    pub fn get(&self, id: &str) -> Option<Arc<WidgetDefinition>> {
        self.snapshot().get(id).cloned()
    }

    /// Check if a definition exists
    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().contains(id)
    }

    /// All definitions in registry order
    pub fn all(&self) -> Vec<Arc<WidgetDefinition>> {
        self.snapshot().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Definitions usable in `mode`
    pub fn filter_by_mode(&self, mode: UserMode) -> Vec<Arc<WidgetDefinition>> {
        self.snapshot().filter_by_mode(mode)
    }

    /// Definitions usable in `mode`, grouped by category
    pub fn group_by_category(&self, mode: UserMode) -> IndexMap<String, Vec<Arc<WidgetDefinition>>> {
        self.snapshot().group_by_category(mode)
    }

    /// Add or replace a definition
    pub fn insert(&self, def: WidgetDefinition) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Catalog::clone(&guard);
        next.insert(def);
        *guard = Arc::new(next);
    }

    /// Write a definition to `<dir>/<id>.json` and register it
    ///
    /// The registry is only updated once the file is written.
    pub fn save(&self, dir: &Path, def: WidgetDefinition) -> Result<PathBuf, DefinitionError> {
        let path = def.save(dir)?;
        tracing::debug!("saved widget '{}' to {}", def.id, path.display());
        self.insert(def);
        Ok(path)
    }

    /// Remove a definition from memory; returns whether anything was removed
    ///
    /// Files backing the definition or its template are left alone.
    pub fn remove(&self, id: &str) -> bool {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.contains(id) {
            return false;
        }
        let mut next = Catalog::clone(&guard);
        next.definitions.shift_remove(id);
        *guard = Arc::new(next);
        true
    }
}
