//! # sv-scatter
//!
//! Parallel SystemVerilog to Verilog conversion stage for a hardware build.
//!
//! A generator dumps one `.sv` file per module into a source directory. This
//! crate selects the files that should be converted (skipping excluded
//! modules and `_pkg` packages, which are instead passed as context to every
//! conversion), runs one `sv2v` process per file on a bounded worker pool, and
//! guarantees every output ends in a newline. One hand-written file is
//! converted afterwards as a special case.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write the default configuration, adjust paths, then run
//! sv-scatter config init
//! sv-scatter run -j 8
//!
//! # Show the commands without running them
//! sv-scatter run --dry-run
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod parallel;
pub mod pipeline;
pub mod shared;

pub use cli::{Cli, Output};
pub use config::ScatterConfig;
pub use error::{Result, ScatterError};
pub use pipeline::{Pipeline, RunOptions, RunReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
