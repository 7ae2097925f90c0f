//! Metrics engine.
//!
//! Two independent scorers: classification (precision / recall / F1 over
//! aligned class values) and text overlap (ROUGE-L over evidence spans).

mod classification;
mod report;
mod rouge;

pub use classification::{
    compute_metrics, flatten_labels, Average, ClassificationMetrics, ConfusionCounts,
};
pub use report::{ClassMetrics, ClassificationReport};
pub use rouge::{lcs_length, rouge_l, score_text_overlap, tokenize, LabelRouge, RougeScore, RougeSummary};

use thiserror::Error;

/// Errors from the scorers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Gold and predicted label vectors differ in length ({gold} vs {predicted})")]
    LengthMismatch { gold: usize, predicted: usize },

    #[error("Label '{label}' not found for note {id}")]
    LabelNotFound { id: String, label: String },
}

/// Round to 4 decimal digits.
///
/// Rounds the exact binary value, so a true tie such as 5/32 goes to the
/// even digit while 0.12345 (stored slightly above the tie) goes up.
pub fn round4(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub(crate) fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
