//! Command-line interface for sv-scatter

pub mod commands;
mod output;

pub use commands::Cli;
pub use output::Output;
