//! Precision, recall and F1 over aligned class values.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alignment::AlignedPair;
use crate::annotation::ClassValue;
use crate::task::LabelSet;

use super::{round4, safe_ratio, MetricsError};

/// How per-class counts are turned into a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Average {
    /// Scores for the positive class only.
    #[default]
    Binary,
    /// Counts pooled over both classes before scoring.
    Micro,
}

/// True/false positive and false negative counts for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Count outcomes treating `class` as the positive class.
    pub fn for_class(gold: &[ClassValue], predicted: &[ClassValue], class: ClassValue) -> Self {
        gold.iter()
            .zip(predicted)
            .fold(Self::default(), |mut counts, (&g, &p)| {
                match (g == class, p == class) {
                    (true, true) => counts.true_positives += 1,
                    (false, true) => counts.false_positives += 1,
                    (true, false) => counts.false_negatives += 1,
                    (false, false) => {}
                }
                counts
            })
    }

    fn merge(self, other: Self) -> Self {
        Self {
            true_positives: self.true_positives + other.true_positives,
            false_positives: self.false_positives + other.false_positives,
            false_negatives: self.false_negatives + other.false_negatives,
        }
    }

    pub fn precision(&self) -> f64 {
        safe_ratio(
            self.true_positives as f64,
            (self.true_positives + self.false_positives) as f64,
        )
    }

    pub fn recall(&self) -> f64 {
        safe_ratio(
            self.true_positives as f64,
            (self.true_positives + self.false_negatives) as f64,
        )
    }

    pub fn f1(&self) -> f64 {
        let tp = self.true_positives as f64;
        safe_ratio(
            2.0 * tp,
            2.0 * tp + (self.false_positives + self.false_negatives) as f64,
        )
    }
}

/// Rounded precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    #[serde(rename = "Precision")]
    pub precision: f64,

    #[serde(rename = "Recall")]
    pub recall: f64,

    #[serde(rename = "F1-score")]
    pub f1: f64,
}

/// Compute precision, recall and F1 under the given averaging mode.
///
/// Zero denominators score 0. Results are rounded to 4 digits.
pub fn compute_metrics(
    gold: &[ClassValue],
    predicted: &[ClassValue],
    average: Average,
) -> Result<ClassificationMetrics, MetricsError> {
    if gold.len() != predicted.len() {
        return Err(MetricsError::LengthMismatch {
            gold: gold.len(),
            predicted: predicted.len(),
        });
    }

    let counts = match average {
        Average::Binary => ConfusionCounts::for_class(gold, predicted, ClassValue::Yes),
        Average::Micro => ConfusionCounts::for_class(gold, predicted, ClassValue::No)
            .merge(ConfusionCounts::for_class(gold, predicted, ClassValue::Yes)),
    };
    debug!(?average, ?counts, instances = gold.len(), "classification counts");

    Ok(ClassificationMetrics {
        precision: round4(counts.precision()),
        recall: round4(counts.recall()),
        f1: round4(counts.f1()),
    })
}

/// Build gold and predicted vectors from aligned records.
///
/// Notes in gold order, then labels in label-set order, so multi-label
/// tasks produce one combined vector.
pub fn flatten_labels(
    pairs: &[AlignedPair<'_, ClassValue>],
    labels: &LabelSet,
) -> Result<(Vec<ClassValue>, Vec<ClassValue>), MetricsError> {
    let capacity = pairs.len() * labels.len();
    let mut gold = Vec::with_capacity(capacity);
    let mut predicted = Vec::with_capacity(capacity);

    for pair in pairs {
        for label in labels.iter() {
            let lookup = |record: &crate::annotation::SimpleRecord| {
                record
                    .get(label)
                    .copied()
                    .ok_or_else(|| MetricsError::LabelNotFound {
                        id: pair.id.to_string(),
                        label: label.to_string(),
                    })
            };
            gold.push(lookup(pair.gold)?);
            predicted.push(lookup(pair.predicted)?);
        }
    }

    Ok((gold, predicted))
}
