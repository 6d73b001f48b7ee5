//! Conversion pipeline
//!
//! ```text
//! SourceCatalog ──▶ bulk tasks ──▶ worker pool (N converters in flight)
//!                                        │ each: convert, then normalize
//!                                        ▼
//!                                  join barrier
//!                                        │
//!                                        ▼
//!                           special-case conversion (sequential)
//!                                        │
//!                                        ▼
//!                                    RunReport
//! ```
//!
//! A failing conversion never stops its siblings. Every outcome is recorded
//! and the caller decides the verdict from the [`RunReport`] once everything
//! has finished.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::catalog::SourceCatalog;
use crate::config::ScatterConfig;
use crate::convert::{CommandTemplate, ConversionTask, TaskRunner};
use crate::error::{Result, ScatterError};
use crate::parallel::{ConversionProgress, ExecutionStrategy};

pub mod report;
pub mod special;

pub use report::{RunReport, TaskOutcome, TaskStatus};
pub use special::SpecialCaseStage;

/// Per-invocation knobs that sit on top of the configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Worker count override; `None` derives it from `[parallel]`
    pub jobs: Option<usize>,
    /// Leave out the special-case stage
    pub skip_special: bool,
    /// Draw a progress bar for the bulk batch
    pub show_progress: bool,
}

/// Everything a run would do, resolved but not executed
pub struct Plan {
    pub workers: usize,
    pub bulk: Vec<ConversionTask>,
    pub special_case: Option<SpecialCaseStage>,
}

impl Plan {
    pub fn special_task(&self) -> Option<&ConversionTask> {
        self.special_case.as_ref().map(SpecialCaseStage::task)
    }
}

pub struct Pipeline {
    config: ScatterConfig,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(config: ScatterConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that cancels the run once set (e.g. from a Ctrl+C handler)
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn workers(&self, options: &RunOptions) -> usize {
        match options.jobs {
            Some(jobs) => jobs.max(1),
            None => ExecutionStrategy::calculate_optimal_workers(
                self.config.parallel.max_threads,
                self.config.parallel.thread_percentage,
            ),
        }
    }

    /// Resolve the work set and every command line. Reads the filesystem,
    /// writes nothing, spawns nothing.
    pub fn plan(&self, options: &RunOptions) -> Result<Plan> {
        let scan = SourceCatalog::new(&self.config).scan()?;
        let template = CommandTemplate::bulk(&self.config.converter, &scan.packages)?;
        let bulk: Vec<ConversionTask> = scan
            .work_set
            .iter()
            .map(|item| ConversionTask::bulk(item, &template))
            .collect();

        let special_case = if options.skip_special {
            None
        } else {
            SpecialCaseStage::from_config(&self.config)
        };

        if let Some(stage) = &special_case
            && bulk.iter().any(|task| task.output == stage.task().output)
        {
            return Err(ScatterError::OutputCollision {
                path: stage.task().output.clone(),
            });
        }

        // never more workers than there are tasks to hand out
        Ok(Plan {
            workers: self.workers(options).min(bulk.len()).max(1),
            bulk,
            special_case,
        })
    }

    /// Run the bulk batch, wait for all of it, then the special case.
    ///
    /// Returns `Err` only for problems that prevent the run from starting.
    /// Conversion failures are in the report; see [`RunReport::into_result`].
    pub fn run(&self, options: &RunOptions) -> Result<RunReport> {
        let started = Instant::now();
        let plan = self.plan(options)?;

        which::which(&self.config.converter.program).map_err(|_| ScatterError::ConverterNotFound {
            program: self.config.converter.program.clone(),
        })?;

        create_dir(&self.config.paths.output_dir)?;
        if let Some(parent) = plan.special_task().and_then(|task| task.output.parent()) {
            create_dir(parent)?;
        }

        let runner = TaskRunner::new(self.config.timeout(), self.cancel.clone());
        let strategy = if plan.workers <= 1 {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel { workers: plan.workers }
        };

        tracing::info!(
            "Converting {} files with {} worker(s)",
            plan.bulk.len(),
            strategy.workers()
        );

        let progress = if options.show_progress {
            ConversionProgress::new(plan.bulk.len(), "converting")
        } else {
            ConversionProgress::hidden()
        };

        let bulk_runner = runner.clone();
        let bulk = strategy.execute(
            plan.bulk,
            move |task, _worker_id| {
                let task_started = Instant::now();
                let result = bulk_runner.run(task);
                if let Err(e) = &result {
                    tracing::error!("{}", e);
                }
                TaskOutcome::new(task, result, task_started.elapsed())
            },
            Some(progress.reporter()),
        )?;
        progress.finish();

        // join barrier passed: every bulk task is terminal
        let special_case = plan.special_case.map(|stage| {
            let outcome = stage.run(&runner);
            if !outcome.succeeded() {
                tracing::error!("Special-case conversion of {} failed", outcome.input.display());
            }
            outcome
        });

        Ok(RunReport {
            workers: strategy.workers(),
            bulk,
            special_case,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

fn create_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| ScatterError::OutputDirCreateFailed {
        path: path.to_path_buf(),
        source,
    })
}
