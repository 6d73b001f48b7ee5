use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::convert::{ConversionTask, TaskKind};
use crate::error::{Result, ScatterError};

/// Terminal state of one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Converted,
    Failed {
        reason: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: TaskKind,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn new(task: &ConversionTask, result: Result<()>, elapsed: Duration) -> Self {
        let status = match result {
            Ok(()) => TaskStatus::Converted,
            Err(ScatterError::Cancelled { .. }) => TaskStatus::Cancelled,
            Err(e) => TaskStatus::Failed {
                exit_code: e.exit_code(),
                stderr: e.stderr().to_string(),
                reason: e.to_string(),
            },
        };
        Self {
            input: task.input.clone(),
            output: task.output.clone(),
            kind: task.kind,
            elapsed_ms: elapsed.as_millis() as u64,
            status,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == TaskStatus::Converted
    }
}

/// Outcomes of one pipeline run, collected after the join barrier
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub workers: usize,
    pub bulk: Vec<TaskOutcome>,
    pub special_case: Option<TaskOutcome>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.bulk.iter().chain(self.special_case.iter())
    }

    pub fn total(&self) -> usize {
        self.outcomes().count()
    }

    pub fn converted(&self) -> usize {
        self.outcomes().filter(|o| o.succeeded()).count()
    }

    /// Every outcome that did not convert, cancelled ones included
    pub fn failures(&self) -> Vec<&TaskOutcome> {
        self.outcomes().filter(|o| !o.succeeded()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes().all(TaskOutcome::succeeded)
    }

    /// Whole-run verdict: the conjunction of every task result
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failures().len();
        if failed == 0 {
            Ok(self)
        } else {
            Err(ScatterError::ConversionFailures {
                failed,
                total: self.total(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::CommandTemplate;
    use crate::config::{ConverterConfig, SpecialCaseConfig};

    fn task() -> ConversionTask {
        ConversionTask::special_case(
            &SpecialCaseConfig::default(),
            &CommandTemplate::special_case(&ConverterConfig::default()),
        )
    }

    fn outcome(result: Result<()>) -> TaskOutcome {
        TaskOutcome::new(&task(), result, Duration::from_millis(12))
    }

    #[test]
    fn test_failed_outcome_keeps_diagnostics() {
        let outcome = outcome(Err(ScatterError::ConverterInvocationFailed {
            input: PathBuf::from("clk.v"),
            exit_code: Some(1),
            stderr: "unexpected token".to_string(),
        }));
        match &outcome.status {
            TaskStatus::Failed { exit_code, stderr, .. } => {
                assert_eq!(*exit_code, Some(1));
                assert_eq!(stderr, "unexpected token");
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert!(!outcome.succeeded());
    }

    #[test]
    fn test_report_verdict() {
        let report = RunReport {
            workers: 2,
            bulk: vec![
                outcome(Ok(())),
                outcome(Err(ScatterError::ConverterTimedOut {
                    input: PathBuf::from("slow.sv"),
                    timeout: std::time::Duration::from_secs(5),
                })),
                outcome(Ok(())),
            ],
            special_case: Some(outcome(Ok(()))),
            elapsed_ms: 40,
        };
        assert_eq!(report.total(), 4);
        assert_eq!(report.converted(), 3);
        assert_eq!(report.failures().len(), 1);
        assert!(!report.is_success());

        match report.into_result() {
            Err(ScatterError::ConversionFailures { failed, total }) => {
                assert_eq!((failed, total), (1, 4));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_counts_as_failure() {
        let report = RunReport {
            bulk: vec![outcome(Err(ScatterError::Cancelled {
                input: PathBuf::from("a.sv"),
            }))],
            ..RunReport::default()
        };
        assert_eq!(report.bulk[0].status, TaskStatus::Cancelled);
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(outcome(Ok(()))).unwrap();
        assert_eq!(json["status"], "converted");
        assert_eq!(json["kind"], "special_case");
        assert_eq!(json["elapsed_ms"], 12);
    }
}
