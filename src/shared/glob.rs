//! Glob pattern utilities
//!
//! Auxiliary converter inputs may be written the way a shell would accept
//! them (`../vendor/ip/*/rtl/*_pkg.sv`). This module expands such patterns
//! into concrete, sorted file paths so the converter can be spawned without
//! a shell.

use globset::Glob;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScatterError};

/// Expand a list of file patterns (supporting both literal paths and glob patterns)
/// into a list of actual file paths
///
/// Literal paths are passed through untouched, even when they do not exist,
/// so the converter gets to report them. A glob that matches nothing
/// contributes nothing and logs a warning.
pub fn expand_file_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if is_glob_pattern(pattern) {
            let matches = expand_glob_pattern(pattern)?;
            if matches.is_empty() {
                tracing::warn!("Pattern '{}' matched no files", pattern);
            }
            paths.extend(matches);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Check if a string contains glob pattern characters
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Expand a single glob pattern to matching file paths
///
/// Only the final path component may contain wildcards, matching what a
/// shell does for `dir/*_pkg.sv`. Results are sorted by file name.
pub fn expand_glob_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let file_pattern = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| invalid_pattern(pattern, "pattern has no file name component"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if is_glob_pattern(&parent.to_string_lossy()) {
        return Err(invalid_pattern(pattern, "wildcards are only supported in the file name"));
    }

    let matcher = Glob::new(file_pattern)
        .map_err(|e| invalid_pattern(pattern, &e.to_string()))?
        .compile_matcher();

    let entries = match std::fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list '{}' for pattern '{}': {}", parent.display(), pattern, e);
            return Ok(Vec::new());
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| matcher.is_match(name))
        .collect();
    names.sort();

    Ok(names.into_iter().map(|name| parent_join(path, &name)).collect())
}

// Keep the caller's spelling of the directory (no "./" prefix for bare names).
fn parent_join(pattern: &Path, name: &str) -> PathBuf {
    match pattern.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

fn invalid_pattern(pattern: &str, reason: &str) -> ScatterError {
    ScatterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("*_pkg.sv"));
        assert!(is_glob_pattern("gen/prim_?.sv"));
        assert!(is_glob_pattern("file[123].sv"));
        assert!(!is_glob_pattern("vendor/prim_ram_1p_pkg.sv"));
    }

    #[test]
    fn test_expand_sorted_matches() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("zeta_pkg.sv"), "").unwrap();
        fs::write(base.join("alpha_pkg.sv"), "").unwrap();
        fs::write(base.join("core.sv"), "").unwrap();
        fs::create_dir(base.join("nested_pkg.sv")).unwrap();

        let pattern = format!("{}/*_pkg.sv", base.display());
        let matches = expand_glob_pattern(&pattern)?;
        assert_eq!(matches, vec![base.join("alpha_pkg.sv"), base.join("zeta_pkg.sv")]);
        Ok(())
    }

    #[test]
    fn test_literal_paths_pass_through() -> Result<()> {
        let patterns = vec!["does/not/exist_pkg.sv".to_string()];
        let paths = expand_file_patterns(&patterns)?;
        assert_eq!(paths, vec![PathBuf::from("does/not/exist_pkg.sv")]);
        Ok(())
    }

    #[test]
    fn test_unmatched_glob_contributes_nothing() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let patterns = vec![
            format!("{}/*_pkg.sv", temp_dir.path().display()),
            "lib/extra.sv".to_string(),
        ];
        let paths = expand_file_patterns(&patterns)?;
        assert_eq!(paths, vec![PathBuf::from("lib/extra.sv")]);
        Ok(())
    }

    #[test]
    fn test_wildcard_directory_rejected() {
        let err = expand_glob_pattern("gen/*/foo.sv").unwrap_err();
        assert!(matches!(err, ScatterError::InvalidPattern { .. }));
    }
}
