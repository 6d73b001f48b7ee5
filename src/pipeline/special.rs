use std::time::Instant;

use super::report::TaskOutcome;
use crate::config::ScatterConfig;
use crate::convert::{CommandTemplate, ConversionTask, TaskRunner};

/// The one conversion that runs after the bulk batch has joined.
///
/// Its input is already close to the target language, so it only gets the
/// shared flags, without the package and include context of the bulk
/// template. It has no data dependency on the bulk outputs; running it
/// afterwards keeps it out of the shared argument list.
pub struct SpecialCaseStage {
    task: ConversionTask,
}

impl SpecialCaseStage {
    /// `None` when the stage is disabled in the configuration
    pub fn from_config(config: &ScatterConfig) -> Option<Self> {
        if !config.special_case.enabled {
            return None;
        }
        let template = CommandTemplate::special_case(&config.converter);
        Some(Self {
            task: ConversionTask::special_case(&config.special_case, &template),
        })
    }

    pub fn task(&self) -> &ConversionTask {
        &self.task
    }

    pub fn run(&self, runner: &TaskRunner) -> TaskOutcome {
        tracing::info!("Running special-case conversion: {}", self.task.label());

        let started = Instant::now();
        let result = runner.run(&self.task);
        TaskOutcome::new(&self.task, result, started.elapsed())
    }
}
