use std::path::{Path, PathBuf};

use super::command::{CommandTemplate, ConverterCommand};
use crate::catalog::WorkItem;
use crate::config::SpecialCaseConfig;

/// Which stage a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Bulk,
    SpecialCase,
}

/// One unit of work: an input, the artifact it produces, and the exact
/// command that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub input: PathBuf,
    pub output: PathBuf,
    pub command: ConverterCommand,
    pub kind: TaskKind,
}

impl ConversionTask {
    pub fn bulk(item: &WorkItem, template: &CommandTemplate) -> Self {
        Self {
            command: template.build(&item.input, &item.output),
            input: item.input.clone(),
            output: item.output.clone(),
            kind: TaskKind::Bulk,
        }
    }

    pub fn special_case(config: &SpecialCaseConfig, template: &CommandTemplate) -> Self {
        Self {
            command: template.build(&config.input, &config.output),
            input: config.input.clone(),
            output: config.output.clone(),
            kind: TaskKind::SpecialCase,
        }
    }

    /// Short name for logs and progress lines
    pub fn label(&self) -> String {
        file_label(&self.input)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
