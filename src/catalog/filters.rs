//! Source selection filters
//!
//! Applied to every directory entry in this order:
//! 1. **Exclusion** - exact file name in the exclusion set
//! 2. **Extension** - name must end with the source extension
//! 3. **Package** - names containing the package marker become context
//!
//! The first filter that does not say `Process` decides. Exclusion and
//! extension run first, so an excluded or non-source package file is
//! neither converted nor handed out as context.

use super::source::{ExclusionSet, SourceFile};
use crate::config::FiltersConfig;

/// Decision for whether to convert or skip a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Admit this file into the work set
    Process,
    /// Skip this file with a reason
    Skip(&'static str),
    /// Do not convert this file; pass it to every bulk command instead
    Context,
}

/// A single predicate in the selection chain
pub trait SourceFilter: Send + Sync {
    fn filter(&self, source: &SourceFile) -> FilterDecision;

    /// Name of this filter for logging
    fn name(&self) -> &'static str;
}

pub struct ExclusionFilter {
    exclusions: ExclusionSet,
}

impl ExclusionFilter {
    pub fn new(exclusions: ExclusionSet) -> Self {
        Self { exclusions }
    }
}

impl SourceFilter for ExclusionFilter {
    fn filter(&self, source: &SourceFile) -> FilterDecision {
        if source.is_excluded(&self.exclusions) {
            FilterDecision::Skip("listed in the exclusion set")
        } else {
            FilterDecision::Process
        }
    }

    fn name(&self) -> &'static str {
        "exclusion"
    }
}

pub struct ExtensionFilter {
    extension: String,
}

impl ExtensionFilter {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl SourceFilter for ExtensionFilter {
    fn filter(&self, source: &SourceFile) -> FilterDecision {
        if source.has_suffix(&self.extension) {
            FilterDecision::Process
        } else {
            FilterDecision::Skip("not a source file")
        }
    }

    fn name(&self) -> &'static str {
        "extension"
    }
}

/// Diverts package definitions out of the work set and into the context
/// every bulk command receives.
pub struct PackageFilter {
    marker: String,
}

impl PackageFilter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }
}

impl SourceFilter for PackageFilter {
    fn filter(&self, source: &SourceFile) -> FilterDecision {
        if source.is_package(&self.marker) {
            FilterDecision::Context
        } else {
            FilterDecision::Process
        }
    }

    fn name(&self) -> &'static str {
        "package"
    }
}

/// Ordered chain of filters; the first decision other than `Process` wins.
pub struct FilterChain {
    filters: Vec<Box<dyn SourceFilter>>,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn SourceFilter>>) -> Self {
        Self { filters }
    }

    pub fn from_config(config: &FiltersConfig) -> Self {
        Self::new(vec![
            Box::new(ExclusionFilter::new(config.exclude.iter().cloned().collect())),
            Box::new(ExtensionFilter::new(config.extension.clone())),
            Box::new(PackageFilter::new(config.package_marker.clone())),
        ])
    }

    pub fn evaluate(&self, source: &SourceFile) -> FilterDecision {
        for filter in &self.filters {
            match filter.filter(source) {
                FilterDecision::Process => continue,
                FilterDecision::Skip(reason) => {
                    tracing::debug!("Skipping {} ({} filter: {})", source.name(), filter.name(), reason);
                    return FilterDecision::Skip(reason);
                }
                FilterDecision::Context => {
                    tracing::debug!("Using {} as package context", source.name());
                    return FilterDecision::Context;
                }
            }
        }
        FilterDecision::Process
    }

    pub fn admits(&self, source: &SourceFile) -> bool {
        self.evaluate(source) == FilterDecision::Process
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> FilterChain {
        FilterChain::from_config(&FiltersConfig {
            exclude: vec!["bar.sv".to_string(), "odd_pkg.txt".to_string()],
            extension: ".sv".to_string(),
            output_extension: ".v".to_string(),
            package_marker: "_pkg".to_string(),
        })
    }

    fn source(name: &str) -> SourceFile {
        SourceFile::new("gen", name)
    }

    #[test]
    fn test_excluded_package_is_not_context() {
        let chain = FilterChain::from_config(&FiltersConfig {
            exclude: vec!["legacy_pkg.sv".to_string()],
            ..FiltersConfig::default()
        });
        assert_eq!(
            chain.evaluate(&source("legacy_pkg.sv")),
            FilterDecision::Skip("listed in the exclusion set")
        );
        assert_eq!(chain.evaluate(&source("core_pkg.sv")), FilterDecision::Context);
    }

    #[test]
    fn test_admits_plain_source() {
        assert_eq!(chain().evaluate(&source("foo.sv")), FilterDecision::Process);
    }

    #[test]
    fn test_exclusion_checked_first() {
        // would also fail the extension and package filters
        assert_eq!(
            chain().evaluate(&source("odd_pkg.txt")),
            FilterDecision::Skip("listed in the exclusion set")
        );
        assert!(!chain().admits(&source("bar.sv")));
    }

    #[test]
    fn test_extension_filter() {
        assert_eq!(
            chain().evaluate(&source("foo.svh")),
            FilterDecision::Skip("not a source file")
        );
        assert!(!chain().admits(&source("foo.sv.bak")));
        assert!(!chain().admits(&source("README")));
    }

    #[test]
    fn test_package_filter() {
        assert_eq!(chain().evaluate(&source("foo_pkg.sv")), FilterDecision::Context);
        assert!(!chain().admits(&source("prim_pkg_util.sv")));
        // the extension filter runs first
        assert_eq!(
            chain().evaluate(&source("notes_pkg.md")),
            FilterDecision::Skip("not a source file")
        );
    }
}
