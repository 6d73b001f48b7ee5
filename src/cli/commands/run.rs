use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::Path;
use std::sync::atomic::Ordering;

use crate::cli::Output;
use crate::config::ScatterConfig;
use crate::pipeline::{Pipeline, Plan, RunOptions, RunReport, TaskOutcome, TaskStatus};

#[derive(Args, Default)]
pub struct RunArgs {
    /// Converter processes in flight (defaults to half the available cores)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Kill a converter that runs longer than this (0 disables)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not run the special-case conversion
    #[arg(long)]
    pub skip_special: bool,

    /// Print the planned commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Result format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn execute(args: RunArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let mut config = ScatterConfig::load(custom_config.map(Path::new)).context("Failed to load configuration")?;
    if let Some(secs) = args.timeout {
        config.converter.timeout_secs = secs;
    }

    let options = RunOptions {
        jobs: args.jobs,
        skip_special: args.skip_special,
        show_progress: args.format == OutputFormat::Text && !output.is_quiet(),
    };
    let pipeline = Pipeline::new(config);

    if args.dry_run {
        let plan = pipeline.plan(&options)?;
        return match args.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&plan_json(&plan))?);
                Ok(())
            }
            OutputFormat::Text => {
                print_plan(&plan, output);
                Ok(())
            }
        };
    }

    let cancel = pipeline.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst)) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let report = pipeline.run(&options)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report, output),
    }

    report.into_result().map(|_| ()).context("Conversion stage failed")
}

fn print_plan(plan: &Plan, output: &Output) {
    output.header(&format!(
        "{} bulk conversions with {} worker(s)",
        plan.bulk.len(),
        plan.workers
    ));
    for task in &plan.bulk {
        output.step(&task.command.to_string());
    }
    match plan.special_task() {
        Some(task) => {
            output.header("Special case (after the bulk batch)");
            output.step(&task.command.to_string());
        }
        None => output.info("Special case disabled"),
    }
}

fn plan_json(plan: &Plan) -> serde_json::Value {
    let task = |t: &crate::convert::ConversionTask| {
        serde_json::json!({
            "input": t.input,
            "output": t.output,
            "kind": t.kind,
            "command": t.command.to_string(),
        })
    };
    serde_json::json!({
        "workers": plan.workers,
        "bulk": plan.bulk.iter().map(task).collect::<Vec<_>>(),
        "special_case": plan.special_task().map(task),
    })
}

fn print_summary(report: &RunReport, output: &Output) {
    for outcome in report.failures() {
        print_failure(outcome, output);
    }

    let secs = report.elapsed_ms as f64 / 1000.0;
    if report.is_success() {
        output.success(&format!(
            "Converted {} files in {:.2}s ({} worker(s))",
            report.converted(),
            secs,
            report.workers
        ));
    } else {
        output.error(&format!(
            "{} of {} conversions failed ({:.2}s)",
            report.failures().len(),
            report.total(),
            secs
        ));
    }
    output.verbose(&format!(
        "bulk: {}, special case: {}",
        report.bulk.len(),
        if report.special_case.is_some() { "ran" } else { "skipped" }
    ));
}

fn print_failure(outcome: &TaskOutcome, output: &Output) {
    match &outcome.status {
        TaskStatus::Failed { reason, stderr, .. } => {
            output.error(reason);
            if !stderr.is_empty() {
                output.detail(stderr);
            }
        }
        TaskStatus::Cancelled => output.warning(&format!("Cancelled: {}", outcome.input.display())),
        TaskStatus::Converted => {}
    }
}
