//! Converter invocation
//!
//! - [`command`] turns templates into concrete argument vectors
//! - [`task`] pairs an input and output with its command
//! - [`runner`] executes a task and captures its outcome
//! - [`normalize`] guarantees the trailing newline on every artifact

pub mod command;
pub mod normalize;
pub mod runner;
pub mod task;

pub use command::{CommandTemplate, ConverterCommand};
pub use normalize::normalize;
pub use runner::TaskRunner;
pub use task::{ConversionTask, TaskKind};
