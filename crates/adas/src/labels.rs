//! Detection model class labels

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

/// Labels used when no label file is available
pub const DEFAULT_LABELS: [&str; 6] = ["person", "bicycle", "car", "motorcycle", "airplane", "bus"];

/// Ordered class names, one per model class index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    names: Vec<String>,
}

impl Labels {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load a newline separated label file
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let names = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { names })
    }

    /// Load from `path` if given, falling back to [`DEFAULT_LABELS`]
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(labels) => {
                info!("Loaded {} labels from {}", labels.len(), path.display());
                labels
            }
            Err(e) => {
                warn!("Failed to load labels from {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Name for a class index; unknown indices resolve to the index itself
    pub fn resolve(&self, class_index: usize) -> Cow<'_, str> {
        match self.names.get(class_index) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(class_index.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }
}
