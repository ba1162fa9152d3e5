//! Template content lookup
//!
//! The engine only ever asks a [`ContentProvider`] for the text behind a
//! name. Where that text comes from is up to the provider.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::error::{Result, TemplateError};
use crate::parser::constructs::validate_template_name;

/// Resolves template names to raw template text
pub trait ContentProvider: Send + Sync {
    /// Fetch the content for `name`, failing with
    /// [`TemplateError::NotFound`] when it does not exist
    fn content(&self, name: &str) -> Result<String>;
}

impl<P: ContentProvider + ?Sized> ContentProvider for &P {
    fn content(&self, name: &str) -> Result<String> {
        (**self).content(name)
    }
}

impl<P: ContentProvider + ?Sized> ContentProvider for Arc<P> {
    fn content(&self, name: &str) -> Result<String> {
        (**self).content(name)
    }
}

impl<P: ContentProvider + ?Sized> ContentProvider for Box<P> {
    fn content(&self, name: &str) -> Result<String> {
        (**self).content(name)
    }
}

/// Templates held in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    templates: HashMap<String, String>,
}

impl InMemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, builder style
    pub fn with_template(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    /// Add or replace a template
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.insert(name.into(), content.into());
    }

    /// Whether a template with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are held
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl ContentProvider for InMemoryProvider {
    fn content(&self, name: &str) -> Result<String> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(name, content)| (name.into(), content.into()))
                .collect(),
        }
    }
}

/// Templates read from files under a root directory
///
/// Names are relative paths. Names that are absolute, contain `..`, or
/// resolve outside the root through symlinks are refused.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    /// Create a provider rooted at `root`, which must exist
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_template_name(name)?;

        let relative = Path::new(name);
        if relative
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
        {
            return Err(TemplateError::Validation(format!(
                "Template name '{}' must be a relative path",
                name
            )));
        }

        let path = match fs::canonicalize(self.root.join(relative)) {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TemplateError::NotFound(name.to_string()));
            }
            Err(e) => return Err(TemplateError::Io(e)),
        };

        if !path.starts_with(&self.root) {
            return Err(TemplateError::Validation(format!(
                "Template '{}' resolves outside the template root",
                name
            )));
        }

        Ok(path)
    }
}

impl ContentProvider for DirectoryProvider {
    fn content(&self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        trace!(template = name, path = %path.display(), "Reading template file");

        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateError::NotFound(name.to_string()),
            _ => TemplateError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_lookup() {
        let provider = InMemoryProvider::new().with_template("a.html", "A");
        assert_eq!(provider.content("a.html").unwrap(), "A");
        assert!(matches!(
            provider.content("b.html"),
            Err(TemplateError::NotFound(name)) if name == "b.html"
        ));
    }

    #[test]
    fn test_in_memory_from_iter() {
        let provider: InMemoryProvider = [("x", "1"), ("y", "2")].into_iter().collect();
        assert_eq!(provider.len(), 2);
        assert!(provider.contains("y"));
    }

    #[test]
    fn test_shared_provider_impls() {
        let provider = Arc::new(InMemoryProvider::new().with_template("a", "A"));
        assert_eq!(provider.content("a").unwrap(), "A");

        let boxed: Box<dyn ContentProvider> = Box::new(InMemoryProvider::new().with_template("b", "B"));
        assert_eq!(boxed.content("b").unwrap(), "B");
    }

    #[test]
    fn test_directory_reads_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("partials")).unwrap();
        fs::write(temp_dir.path().join("partials/nav.html"), "<nav/>").unwrap();

        let provider = DirectoryProvider::new(temp_dir.path()).unwrap();
        assert_eq!(provider.content("partials/nav.html").unwrap(), "<nav/>");
    }

    #[test]
    fn test_directory_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(temp_dir.path()).unwrap();
        assert!(matches!(
            provider.content("absent.html"),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_refuses_traversal_and_absolute_names() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp_dir.path().join("secret.txt"), "secret").unwrap();

        let provider = DirectoryProvider::new(&root).unwrap();
        assert!(matches!(
            provider.content("../secret.txt"),
            Err(TemplateError::Validation(_))
        ));

        let absolute = temp_dir.path().join("secret.txt");
        assert!(matches!(
            provider.content(&absolute.to_string_lossy()),
            Err(TemplateError::Validation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_refuses_symlink_escape() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp_dir.path().join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("secret.txt"), root.join("link.txt")).unwrap();

        let provider = DirectoryProvider::new(&root).unwrap();
        assert!(matches!(
            provider.content("link.txt"),
            Err(TemplateError::Validation(_))
        ));
    }

    #[test]
    fn test_directory_root_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        assert!(DirectoryProvider::new(temp_dir.path().join("nope")).is_err());
    }
}
