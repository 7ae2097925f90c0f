//! Evaluation results and their printed forms.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::metrics::{ClassificationMetrics, ClassificationReport, RougeSummary};

/// What a task produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Label-only tasks.
    Classification {
        metrics: ClassificationMetrics,
        report: ClassificationReport,
    },
    /// Evidence tasks.
    TextOverlap { rouge_l: RougeSummary },
}

/// A finished evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub task: String,
    pub gold_notes: usize,
    pub prediction_notes: usize,
    pub outcome: TaskOutcome,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// Human-readable report, as printed by the CLI.
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Pretty-printed JSON report.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            TaskOutcome::Classification { metrics, report } => {
                writeln!(f, "{}", report)?;
                writeln!(f, "Evaluation results for {}:", self.task)?;
                writeln!(f, "Precision: {:.4}", metrics.precision)?;
                writeln!(f, "Recall: {:.4}", metrics.recall)?;
                writeln!(f, "F1-score: {:.4}", metrics.f1)
            }
            TaskOutcome::TextOverlap { rouge_l } => {
                writeln!(f, "Average ROUGE-L scores per label:")?;
                for label in &rouge_l.per_label {
                    match label.average {
                        Some(average) => writeln!(
                            f,
                            "  {}: {:.4} ({} pairs)",
                            label.label, average, label.pairs
                        )?,
                        None => writeln!(f, "  {}: None", label.label)?,
                    }
                }
                writeln!(f)?;
                writeln!(f, "Evaluation results for {}:", self.task)?;
                writeln!(
                    f,
                    "Average ROUGE-L score across all labels: {:.4}",
                    rouge_l.overall
                )
            }
        }
    }
}
