use std::path::Path;

use tracing::info;

use super::ClassifyError;

/// The ordered list of class labels the classifier's probability
/// distribution indexes into. Loaded once at startup; an unusable asset is
/// a construction error, never a latent state discovered at first lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCatalog {
    labels: Vec<String>,
}

impl ClassCatalog {
    /// Load the catalog from a JSON array of label strings.
    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifyError::CatalogRead {
            path: path.display().to_string(),
            source,
        })?;
        let labels: Vec<String> = serde_json::from_str(&raw)?;
        let catalog = Self::from_labels(labels)?;
        info!(classes = catalog.len(), path = %path.display(), "class catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from an explicit label list.
    pub fn from_labels(labels: Vec<String>) -> Result<Self, ClassifyError> {
        if labels.is_empty() {
            return Err(ClassifyError::CatalogEmpty);
        }
        Ok(Self { labels })
    }

    /// Label at a distribution index, `None` when out of range.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
