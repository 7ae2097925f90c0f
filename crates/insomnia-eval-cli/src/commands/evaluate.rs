use anyhow::{Context, Result};
use insomnia_eval_core::{evaluate_files, EvaluationReport, TaskConfig, ValidationMode};
use tracing::{debug, info};

use crate::cli::{CustomArgs, EvalArgs, OutputFormat};

pub fn run(task: TaskConfig, args: EvalArgs) -> Result<()> {
    let mode = if args.aggregate_errors {
        ValidationMode::Aggregate
    } else {
        ValidationMode::FailFast
    };

    info!(
        task = %task.name,
        gold = %args.gs_path.display(),
        predictions = %args.pred_path.display(),
        "scoring submission"
    );

    let report = evaluate_files(&task, &args.gs_path, &args.pred_path, mode)
        .with_context(|| format!("{} evaluation failed", task.name))?;

    println!("{}", render(&report, args.format)?);
    Ok(())
}

pub fn run_custom(args: CustomArgs) -> Result<()> {
    let task = TaskConfig::from_file(&args.task_config).with_context(|| {
        format!(
            "failed to load task config {}",
            args.task_config.display()
        )
    })?;
    debug!(labels = task.labels.len(), variant = ?task.variant, "loaded task config");

    run(task, args.eval)
}

fn render(report: &EvaluationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text().trim_end().to_string()),
        OutputFormat::Json => report
            .render_json()
            .context("failed to serialize evaluation report"),
    }
}
