//! Source catalog: decides which files reach the converter
//!
//! The catalog lists the source directory once, runs every entry through the
//! [`FilterChain`], and appends the toplevel entry, which lives outside the
//! scanned directory and bypasses the filters. Each admitted file becomes a
//! [`WorkItem`] with an output path derived from its name. Package files
//! found in the same listing become the context of every bulk command, so
//! what is filtered out as a package is exactly what is passed back in.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::ScatterConfig;
use crate::error::{Result, ScatterError};

pub mod filters;
pub mod source;

pub use filters::{FilterChain, FilterDecision, SourceFilter};
pub use source::{ExclusionSet, SourceFile};

/// Where a work item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Admitted from the source directory listing
    Catalog,
    /// The fixed toplevel entry
    Toplevel,
}

/// Everything one listing of the source directory yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogScan {
    /// Inputs of the bulk batch, toplevel last
    pub work_set: Vec<WorkItem>,
    /// Package files, in name order, supplied to every bulk command
    pub packages: Vec<PathBuf>,
}

/// One admitted input and the artifact it converts into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub input: PathBuf,
    pub output: PathBuf,
    pub origin: Origin,
}

pub struct SourceCatalog {
    source_dir: PathBuf,
    output_dir: PathBuf,
    toplevel: PathBuf,
    extension: String,
    output_extension: String,
    filters: FilterChain,
}

impl SourceCatalog {
    pub fn new(config: &ScatterConfig) -> Self {
        Self {
            source_dir: config.paths.source_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            toplevel: config.paths.toplevel.clone(),
            extension: config.filters.extension.clone(),
            output_extension: config.filters.output_extension.clone(),
            filters: FilterChain::from_config(&config.filters),
        }
    }

    /// Regular files in the source directory, sorted by name
    pub fn list_sources(&self) -> Result<Vec<SourceFile>> {
        if !self.source_dir.is_dir() {
            return Err(ScatterError::DirectoryNotFound {
                path: self.source_dir.clone(),
            });
        }

        let read_failed = |source| ScatterError::DirectoryReadFailed {
            path: self.source_dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.source_dir).map_err(read_failed)? {
            let entry = entry.map_err(read_failed)?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => tracing::warn!("Skipping non UTF-8 file name {:?}", name),
            }
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| SourceFile::new(&self.source_dir, name))
            .collect())
    }

    /// Build the authoritative work set and the package context.
    ///
    /// Catalog entries come first in name order, the toplevel entry last.
    /// Output paths are pairwise distinct: a catalog entry whose output would
    /// collide with the toplevel's is dropped.
    pub fn scan(&self) -> Result<CatalogScan> {
        let sources = self.list_sources()?;
        let scanned = sources.len();

        let mut items = Vec::new();
        let mut packages = Vec::new();
        for source in sources {
            match self.filters.evaluate(&source) {
                FilterDecision::Process => items.push(WorkItem {
                    output: self.output_path_for(source.name()),
                    input: source.path(),
                    origin: Origin::Catalog,
                }),
                FilterDecision::Context => packages.push(source.path()),
                FilterDecision::Skip(_) => {}
            }
        }

        let toplevel_output = match self.toplevel.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.output_path_for(name),
            None => {
                return Err(ScatterError::InvalidConfig(format!(
                    "toplevel path has no file name: {}",
                    self.toplevel.display()
                )));
            }
        };
        items.retain(|item| {
            let collides = item.output == toplevel_output;
            if collides {
                tracing::warn!(
                    "Dropping {} from the work set: the toplevel entry writes the same output {}",
                    item.input.display(),
                    toplevel_output.display()
                );
            }
            !collides
        });
        items.push(WorkItem {
            input: self.toplevel.clone(),
            output: toplevel_output,
            origin: Origin::Toplevel,
        });

        debug_assert!(outputs_are_distinct(&items));
        tracing::info!(
            "Work set: {} of {} directory entries admitted plus the toplevel entry, {} package(s) as context",
            items.len() - 1,
            scanned,
            packages.len()
        );
        Ok(CatalogScan {
            work_set: items,
            packages,
        })
    }

    /// `foo.sv` → `<output_dir>/foo.v`
    pub fn output_path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir
            .join(replace_extension(file_name, &self.extension, &self.output_extension))
    }

}

/// Swap the source suffix for the output suffix. Names without the source
/// suffix lose whatever extension they have instead.
fn replace_extension(file_name: &str, extension: &str, output_extension: &str) -> String {
    let stem = match file_name.strip_suffix(extension) {
        Some(stem) if !extension.is_empty() => stem,
        _ => Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name),
    };
    format!("{stem}{output_extension}")
}

fn outputs_are_distinct(items: &[WorkItem]) -> bool {
    let mut seen = HashSet::new();
    items.iter().all(|item| seen.insert(&item.output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(temp: &TempDir) -> ScatterConfig {
        let mut config = ScatterConfig::default();
        config.paths.source_dir = temp.path().join("sv_sources");
        config.paths.output_dir = temp.path().join("scattered");
        config.paths.toplevel = temp.path().join("rtl/top.sv");
        config.filters.exclude = vec!["bar.sv".to_string()];
        config
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "module m; endmodule").unwrap();
    }

    fn input_names(items: &[WorkItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| i.input.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_filters_and_toplevel() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp);
        fs::create_dir_all(&config.paths.source_dir).unwrap();
        touch(&config.paths.source_dir, "foo.sv");
        touch(&config.paths.source_dir, "foo_pkg.sv");
        touch(&config.paths.source_dir, "bar.sv");

        let items = SourceCatalog::new(&config).scan()?.work_set;
        assert_eq!(input_names(&items), vec!["foo.sv", "top.sv"]);
        assert_eq!(items[0].output, temp.path().join("scattered/foo.v"));
        assert_eq!(items[0].origin, Origin::Catalog);
        assert_eq!(items[1].input, temp.path().join("rtl/top.sv"));
        assert_eq!(items[1].output, temp.path().join("scattered/top.v"));
        assert_eq!(items[1].origin, Origin::Toplevel);
        Ok(())
    }

    #[test]
    fn test_empty_directory_yields_toplevel_only() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp);
        fs::create_dir_all(&config.paths.source_dir).unwrap();

        let items = SourceCatalog::new(&config).scan()?.work_set;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].origin, Origin::Toplevel);
        Ok(())
    }

    #[test]
    fn test_packages_become_context() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let mut config = config_for(&temp);
        config.paths.source_dir = temp.path().join("rtl_gen");
        config.filters.exclude.push("legacy_pkg.sv".to_string());
        fs::create_dir_all(&config.paths.source_dir).unwrap();
        for name in ["core.sv", "core_pkg.sv", "alu_pkg.sv", "legacy_pkg.sv", "notes_pkg.md"] {
            touch(&config.paths.source_dir, name);
        }

        let scan = SourceCatalog::new(&config).scan()?;
        assert_eq!(input_names(&scan.work_set), vec!["core.sv", "top.sv"]);
        assert_eq!(
            scan.packages,
            vec![
                config.paths.source_dir.join("alu_pkg.sv"),
                config.paths.source_dir.join("core_pkg.sv"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp);
        let err = SourceCatalog::new(&config).scan().unwrap_err();
        assert!(matches!(err, ScatterError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_subdirectories_are_ignored() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp);
        fs::create_dir_all(config.paths.source_dir.join("nested.sv")).unwrap();
        touch(&config.paths.source_dir, "a.sv");

        let items = SourceCatalog::new(&config).scan()?.work_set;
        assert_eq!(input_names(&items), vec!["a.sv", "top.sv"]);
        Ok(())
    }

    #[test]
    fn test_toplevel_wins_output_collision() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp);
        fs::create_dir_all(&config.paths.source_dir).unwrap();
        touch(&config.paths.source_dir, "top.sv");
        touch(&config.paths.source_dir, "core.sv");

        let items = SourceCatalog::new(&config).scan()?.work_set;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].input, config.paths.source_dir.join("core.sv"));
        assert_eq!(items[1].origin, Origin::Toplevel);
        assert_eq!(items.iter().filter(|i| i.output.ends_with("top.v")).count(), 1);
        Ok(())
    }

    #[test]
    fn test_sorted_order() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp);
        fs::create_dir_all(&config.paths.source_dir).unwrap();
        for name in ["zeta.sv", "alpha.sv", "mid.sv"] {
            touch(&config.paths.source_dir, name);
        }

        let items = SourceCatalog::new(&config).scan()?.work_set;
        assert_eq!(input_names(&items), vec!["alpha.sv", "mid.sv", "zeta.sv", "top.sv"]);
        Ok(())
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("foo.sv", ".sv", ".v"), "foo.v");
        assert_eq!(replace_extension("foo.sv.sv", ".sv", ".v"), "foo.sv.v");
        assert_eq!(replace_extension("clk.v", ".sv", ".v"), "clk.v");
        assert_eq!(replace_extension("noext", ".sv", ".v"), "noext.v");
    }
}
