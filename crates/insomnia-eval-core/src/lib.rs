//! # insomnia-eval-core
//!
//! Validation and scoring engine for insomnia detection submissions.
//!
//! This crate grades a predictions document against a gold standard:
//! - Are both documents well formed for the task?
//! - Does every gold note have a prediction?
//! - How close are the predictions?
//!
//! ## Pipeline
//!
//! 1. **Schema validation**: each document becomes a typed, ordered
//!    `AnnotationSet`; the first malformed record stops the run
//! 2. **Alignment**: every gold note ID must appear in the predictions;
//!    all missing IDs are reported at once
//! 3. **Scoring**: precision / recall / F1 for label-only tasks, ROUGE-L
//!    over evidence spans for evidence tasks
//!
//! ## Example
//!
//! ```rust,ignore
//! use insomnia_eval_core::{evaluate_files, TaskConfig, ValidationMode};
//!
//! let task = TaskConfig::subtask1();
//! let report = evaluate_files(&task, "gold.json", "preds.json", ValidationMode::FailFast)?;
//! println!("{}", report.render_text());
//! ```

pub mod alignment;
pub mod annotation;
pub mod metrics;
pub mod outcome;
pub mod schema;
pub mod task;

// Re-export main types at crate root
pub use alignment::{align, check_alignment, AlignedPair, AlignmentError};
pub use annotation::{
    AnnotationSet, ClassValue, DocumentRole, Evidence, EvidenceAnnotations, Record,
    SimpleAnnotations,
};
pub use metrics::{
    compute_metrics, score_text_overlap, Average, ClassificationMetrics, ClassificationReport,
    MetricsError, RougeSummary,
};
pub use outcome::{EvaluationReport, TaskOutcome};
pub use schema::{SchemaError, SchemaValidator, ValidationError, ValidationMode};
pub use task::{ConfigError, LabelSet, RecordVariant, TaskConfig};

use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during evaluation
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Read and parse one annotation document.
///
/// The whole file is read before parsing begins.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, EvaluationError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| EvaluationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| EvaluationError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load both documents from disk and evaluate them.
pub fn evaluate_files(
    task: &TaskConfig,
    gold_path: impl AsRef<Path>,
    predictions_path: impl AsRef<Path>,
    mode: ValidationMode,
) -> Result<EvaluationReport, EvaluationError> {
    let gold = load_document(gold_path)?;
    let predictions = load_document(predictions_path)?;
    evaluate(task, &gold, &predictions, mode)
}

/// Validate, align and score two parsed documents.
///
/// This is the main entry point for evaluation.
///
/// # Arguments
///
/// * `task` - Label set, record variant and averaging mode
/// * `gold` - The gold standard document
/// * `predictions` - The system predictions document
/// * `mode` - Whether schema validation stops at the first error
pub fn evaluate(
    task: &TaskConfig,
    gold: &Value,
    predictions: &Value,
    mode: ValidationMode,
) -> Result<EvaluationReport, EvaluationError> {
    let gold_validator =
        SchemaValidator::new(&task.labels, DocumentRole::GoldStandard).with_mode(mode);
    let prediction_validator =
        SchemaValidator::new(&task.labels, DocumentRole::Predictions).with_mode(mode);

    let (gold_notes, prediction_notes, outcome) = match task.variant {
        RecordVariant::Simple => {
            let gold = gold_validator.validate_simple(gold)?;
            let predictions = prediction_validator.validate_simple(predictions)?;
            let outcome = score_classification(task, &gold, &predictions)?;
            (gold.len(), predictions.len(), outcome)
        }
        RecordVariant::Evidence => {
            let gold = gold_validator.validate_evidence(gold)?;
            let predictions = prediction_validator.validate_evidence(predictions)?;
            let pairs = align(&gold, &predictions)?;
            let rouge_l = score_text_overlap(&pairs, &task.labels)?;
            (gold.len(), predictions.len(), TaskOutcome::TextOverlap { rouge_l })
        }
    };

    info!(
        task = %task.name,
        gold_notes,
        prediction_notes,
        "evaluation complete"
    );

    Ok(EvaluationReport {
        task: task.name.clone(),
        gold_notes,
        prediction_notes,
        outcome,
        evaluated_at: Utc::now(),
    })
}

fn score_classification(
    task: &TaskConfig,
    gold: &SimpleAnnotations,
    predictions: &SimpleAnnotations,
) -> Result<TaskOutcome, EvaluationError> {
    let pairs = align(gold, predictions)?;
    let (gold_labels, predicted_labels) = metrics::flatten_labels(&pairs, &task.labels)?;

    let report = ClassificationReport::new(&gold_labels, &predicted_labels)?;
    let metrics = compute_metrics(&gold_labels, &predicted_labels, task.average)?;

    Ok(TaskOutcome::Classification { metrics, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subtask1_end_to_end() {
        let gold = json!({"n1": {"Insomnia": "yes"}, "n2": {"Insomnia": "no"}});
        let predictions = json!({"n1": {"Insomnia": "yes"}, "n2": {"Insomnia": "yes"}});

        let report = evaluate(
            &TaskConfig::subtask1(),
            &gold,
            &predictions,
            ValidationMode::FailFast,
        )
        .unwrap();

        let TaskOutcome::Classification { metrics, .. } = report.outcome else {
            panic!("expected classification outcome");
        };
        assert_eq!(metrics.precision, 0.5);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1, 0.6667);
    }

    #[test]
    fn test_subtask2b_end_to_end() {
        let document = json!({
            "n1": {
                "Definition 1": {"label": "yes", "text": ["sleep onset delay"]},
                "Definition 2": {"label": "no", "text": []},
                "Rule B": {"label": "no", "text": []},
                "Rule C": {"label": "no", "text": []}
            }
        });

        let report = evaluate(
            &TaskConfig::subtask2b(),
            &document,
            &document,
            ValidationMode::FailFast,
        )
        .unwrap();

        let TaskOutcome::TextOverlap { rouge_l } = &report.outcome else {
            panic!("expected text overlap outcome");
        };
        assert_eq!(rouge_l.per_label[0].average, Some(1.0));
        assert_eq!(rouge_l.overall, 1.0);
    }

    #[test]
    fn test_subtask2a_uses_micro_average() {
        let labels = json!({"Definition 1": "yes", "Definition 2": "no", "Rule B": "yes", "Rule C": "no"});
        let miss = json!({"Definition 1": "no", "Definition 2": "no", "Rule B": "yes", "Rule C": "no"});
        let gold = json!({"n1": labels});
        let predictions = json!({"n1": miss});

        let report = evaluate(
            &TaskConfig::subtask2a(),
            &gold,
            &predictions,
            ValidationMode::FailFast,
        )
        .unwrap();

        let TaskOutcome::Classification { metrics, report } = report.outcome else {
            panic!("expected classification outcome");
        };
        // 3 of 4 label instances correct
        assert_eq!(metrics.precision, 0.75);
        assert_eq!(metrics.f1, 0.75);
        assert_eq!(report.accuracy, 0.75);
    }

    #[test]
    fn test_missing_predictions_stop_scoring() {
        let gold = json!({
            "n1": {"Insomnia": "yes"},
            "n2": {"Insomnia": "no"},
            "n3": {"Insomnia": "no"}
        });
        let predictions = json!({"n1": {"Insomnia": "yes"}, "n3": {"Insomnia": "no"}});

        let err = evaluate(
            &TaskConfig::subtask1(),
            &gold,
            &predictions,
            ValidationMode::FailFast,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EvaluationError::Alignment(AlignmentError::MissingPredictions(ref ids)) if ids == &["n2".to_string()]
        ));
    }

    #[test]
    fn test_gold_validated_before_predictions() {
        let gold = json!({"n1": {"Insomnia": "perhaps"}});
        let predictions = json!({"n1": {}});

        let err = evaluate(
            &TaskConfig::subtask1(),
            &gold,
            &predictions,
            ValidationMode::FailFast,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EvaluationError::Validation(ValidationError::Schema(SchemaError::InvalidLabelValue {
                role: DocumentRole::GoldStandard,
                ..
            }))
        ));
    }

    #[test]
    fn test_extra_predictions_ignored() {
        let gold = json!({"n1": {"Insomnia": "yes"}});
        let predictions = json!({"n0": {"Insomnia": "no"}, "n1": {"Insomnia": "yes"}, "n9": {"Insomnia": "no"}});

        let report = evaluate(
            &TaskConfig::subtask1(),
            &gold,
            &predictions,
            ValidationMode::FailFast,
        )
        .unwrap();

        assert_eq!(report.gold_notes, 1);
        assert_eq!(report.prediction_notes, 3);
        let TaskOutcome::Classification { metrics, .. } = report.outcome else {
            panic!("expected classification outcome");
        };
        assert_eq!(metrics.f1, 1.0);
    }

    #[test]
    fn test_evaluate_files_reports_paths() {
        let dir = std::env::temp_dir().join(format!("insomnia-eval-core-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let gold_path = dir.join("gold.json");
        let pred_path = dir.join("preds.json");
        fs::write(&gold_path, r#"{"n1": {"Insomnia": "YES"}}"#).unwrap();
        fs::write(&pred_path, r#"{"n1": {"Insomnia": "yes""#).unwrap();

        let err = evaluate_files(
            &TaskConfig::subtask1(),
            &gold_path,
            &pred_path,
            ValidationMode::FailFast,
        )
        .unwrap_err();
        assert!(matches!(err, EvaluationError::Json { ref path, .. } if path == &pred_path));

        fs::write(&pred_path, r#"{"n1": {"Insomnia": "Yes"}}"#).unwrap();
        let report = evaluate_files(
            &TaskConfig::subtask1(),
            &gold_path,
            &pred_path,
            ValidationMode::FailFast,
        )
        .unwrap();
        assert!(report.render_text().contains("F1-score: 1.0000"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = load_document("/nonexistent/insomnia-eval/gold.json").unwrap_err();
        assert!(matches!(err, EvaluationError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/insomnia-eval/gold.json"));
    }
}
