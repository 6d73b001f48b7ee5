use std::collections::BTreeSet;
use std::path::PathBuf;

/// A candidate source file found in the scanned directory.
///
/// Materialized once from the directory listing and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    dir: PathBuf,
    name: String,
}

impl SourceFile {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.name.ends_with(suffix)
    }

    /// Package definition files carry the marker somewhere in their name.
    /// An empty marker marks nothing.
    pub fn is_package(&self, marker: &str) -> bool {
        !marker.is_empty() && self.name.contains(marker)
    }

    pub fn is_excluded(&self, exclusions: &ExclusionSet) -> bool {
        exclusions.contains(&self.name)
    }
}

/// File names that must never be handed to the converter. Matching is by
/// exact file name, never by path or pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
