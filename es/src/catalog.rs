//! Catalog of images to rate
//!
//! The catalog is a pure function of the item source: categories in their
//! configured order, each contributing its image files sorted by name. Two
//! builds against an unchanged source yield the same sequence, which is what
//! lets progress be recomputed from a result log alone.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::SurveyError;

/// Recognized image extensions (case-insensitive)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A named grouping of images; list order is presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Directory name and file-name prefix, e.g. `saga`
    pub code: String,
    /// Human display name
    pub name: String,
}

impl Category {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// One image to be rated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Item {
    category: String,
    file_name: String,
}

impl Item {
    pub fn new(category: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            file_name: file_name.into(),
        }
    }

    /// Code of the category this item was listed under
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Bare file name; this is the item's identity in result logs
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// `category/file_name`
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.category, self.file_name)
    }

    /// Location of the image under the image root
    pub fn path_under(&self, root: &Path) -> PathBuf {
        root.join(&self.category).join(&self.file_name)
    }
}

/// Whether a file name carries a recognized image extension
pub fn is_image_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// The full ordered sequence for one experiment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// File names listed under more than one category, with those categories
    ///
    /// Result logs key items by bare file name, so such files share one
    /// done-set entry.
    pub fn filename_collisions(&self) -> BTreeMap<String, Vec<String>> {
        let mut seen: HashMap<&str, Vec<String>> = HashMap::new();
        for item in &self.items {
            seen.entry(item.file_name()).or_default().push(item.category().to_string());
        }
        seen.into_iter()
            .filter(|(_, categories)| categories.len() > 1)
            .map(|(name, categories)| (name.to_string(), categories))
            .collect()
    }
}

/// Lists the files of one category
pub trait ItemSource {
    /// File names in `category`, or `None` when the category has no backing source
    fn list(&self, category: &Category) -> Result<Option<Vec<String>>, SurveyError>;
}

/// Item source backed by `<root>/<category code>/` directories
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ItemSource for DirectorySource {
    fn list(&self, category: &Category) -> Result<Option<Vec<String>>, SurveyError> {
        let dir = self.root.join(&category.code);
        if !dir.is_dir() {
            debug!(?dir, "DirectorySource::list: category directory absent");
            return Ok(None);
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                // Depth 0 is the category directory itself
                Err(e) if e.depth() == 0 => {
                    return Err(SurveyError::Listing {
                        category: category.code.clone(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    warn!(category = %category.code, path = ?e.path(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => warn!(path = ?entry.path(), "Skipping image with non-UTF-8 file name"),
            }
        }
        Ok(Some(names))
    }
}

/// In-memory item source
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    categories: HashMap<String, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category<I, S>(mut self, code: &str, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(code.to_string(), files.into_iter().map(Into::into).collect());
        self
    }
}

impl ItemSource for MemorySource {
    fn list(&self, category: &Category) -> Result<Option<Vec<String>>, SurveyError> {
        Ok(self.categories.get(&category.code).cloned())
    }
}

/// Builds the catalog from a fixed category list and an item source
#[derive(Debug, Clone)]
pub struct CatalogBuilder<S> {
    categories: Vec<Category>,
    source: S,
}

impl<S: ItemSource> CatalogBuilder<S> {
    pub fn new(categories: Vec<Category>, source: S) -> Self {
        Self { categories, source }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build the full ordered sequence; no side effects
    pub fn build(&self) -> Result<Catalog, SurveyError> {
        let mut items = Vec::new();

        for category in &self.categories {
            let Some(mut names) = self.source.list(category)? else {
                continue;
            };
            names.retain(|n| is_image_file(n));
            names.sort();
            debug!(category = %category.code, count = names.len(), "CatalogBuilder::build: listed category");
            items.extend(names.into_iter().map(|n| Item::new(category.code.clone(), n)));
        }

        let catalog = Catalog { items };
        for (file_name, categories) in catalog.filename_collisions() {
            warn!(%file_name, ?categories, "Image file name appears in several categories; ratings are shared");
        }
        info!(total = catalog.total(), "Catalog built");
        Ok(catalog)
    }
}
