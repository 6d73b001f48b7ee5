//! Configuration management for sv-scatter
//!
//! Every directory, file list, and command fragment the pipeline needs lives
//! in one [`ScatterConfig`] value that is handed to each component. Loading
//! and layering (defaults, `sv-scatter.toml`, `SV_SCATTER_*` variables) is
//! implemented in [`core`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, ScatterError};

mod core;

pub use core::CONFIG_FILE_NAME;

/// Main configuration structure for sv-scatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScatterConfig {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Source selection filters
    pub filters: FiltersConfig,

    /// External converter invocation
    pub converter: ConverterConfig,

    /// The one-off conversion run after the bulk batch
    pub special_case: SpecialCaseConfig,

    /// Worker pool sizing
    pub parallel: ParallelConfig,
}

/// Filesystem layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for candidate sources
    pub source_dir: PathBuf,

    /// Directory receiving one converted artifact per source
    pub output_dir: PathBuf,

    /// Top of the design hierarchy, always converted and exempt from filters
    pub toplevel: PathBuf,
}

/// Filters applied to the source directory listing, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Exact file names that must never reach the converter
    pub exclude: Vec<String>,

    /// Suffix a file name must end with to be converted
    pub extension: String,

    /// Suffix given to converted artifacts in place of `extension`
    pub output_extension: String,

    /// Substring marking package files, which the bulk command consumes itself
    pub package_marker: String,
}

/// How the converter is invoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Program name or path
    pub program: String,

    /// Flags shared by bulk and special-case invocations
    pub flags: Vec<String>,

    /// Context inputs for bulk invocations on top of the package files
    /// found in `paths.source_dir` (globs allowed)
    pub aux_inputs: Vec<String>,

    /// Include search directories for bulk invocations
    pub include_dirs: Vec<PathBuf>,

    /// Flag preceding each include directory
    pub include_flag: String,

    /// Flag preceding the output path
    pub output_flag: String,

    /// Per-invocation timeout in seconds (0 = none)
    pub timeout_secs: u64,
}

/// Single conversion that uses the reduced command template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialCaseConfig {
    pub enabled: bool,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Worker pool sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Maximum number of worker threads (0 = no limit)
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("generated/sv_sources"),
            output_dir: PathBuf::from("generated/scattered"),
            toplevel: PathBuf::from("../syn/rtl/rv_core_ibex_mem_top.sv"),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            exclude: [
                // simulation-only tracing
                "ibex_tracer.sv",
                "ibex_top_tracing.sv",
                // alternative register files
                "ibex_register_file_latch.sv",
                "ibex_register_file_fpga.sv",
                // pad wrappers and assertion macros
                "prim_xilinx_pad_wrapper.sv",
                "prim_generic_pad_wrapper.sv",
                "prim_assert.sv",
                "pins_if.sv",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            extension: ".sv".to_string(),
            output_extension: ".v".to_string(),
            package_marker: "_pkg".to_string(),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "sv2v".to_string(),
            flags: vec!["--define=SYNTHESIS".to_string(), "--exclude=Always".to_string()],
            aux_inputs: vec!["../vendor/lowrisc_ip/ip/prim/rtl/prim_ram_1p_pkg.sv".to_string()],
            include_dirs: vec![
                PathBuf::from("../vendor/lowrisc_ip/ip/prim/rtl"),
                PathBuf::from("../vendor/lowrisc_ip/dv/sv/dv_utils"),
            ],
            include_flag: "-I".to_string(),
            output_flag: "-w".to_string(),
            timeout_secs: 0,
        }
    }
}

impl Default for SpecialCaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            input: PathBuf::from("../syn/rtl/prim_clock_gating.v"),
            output: PathBuf::from("generated/scattered/prim_clock_gating.v"),
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 50,
        }
    }
}

impl ScatterConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.filters.extension.is_empty() {
            return Err(invalid("filters.extension cannot be empty"));
        }
        if self.paths.toplevel.file_name().is_none() {
            return Err(invalid("paths.toplevel must name a file"));
        }
        if self.converter.program.trim().is_empty() {
            return Err(invalid("converter.program cannot be empty"));
        }
        if self.converter.output_flag.is_empty() {
            return Err(invalid("converter.output_flag cannot be empty"));
        }
        if !self.converter.include_dirs.is_empty() && self.converter.include_flag.is_empty() {
            return Err(invalid("converter.include_flag cannot be empty when include_dirs are set"));
        }
        if !(1..=100).contains(&self.parallel.thread_percentage) {
            return Err(invalid(format!(
                "parallel.thread_percentage must be within 1..=100, got {}",
                self.parallel.thread_percentage
            )));
        }
        if self.paths.source_dir == self.paths.output_dir
            && self.filters.extension == self.filters.output_extension
        {
            return Err(invalid(
                "outputs would overwrite their inputs: output_dir equals source_dir and the extensions match",
            ));
        }
        if self.special_case.enabled && self.special_case.input == self.special_case.output {
            return Err(invalid("special_case.output must differ from special_case.input"));
        }
        Ok(())
    }

    /// Per-task timeout, if one is configured
    pub fn timeout(&self) -> Option<std::time::Duration> {
        match self.converter.timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}

fn invalid(message: impl Into<String>) -> ScatterError {
    ScatterError::InvalidConfig(message.into())
}
