//! Per-class classification report.
//!
//! Rendered in the familiar column layout: one row per class, then
//! accuracy, macro and support-weighted averages. Zero division scores 0.

use serde::Serialize;
use std::fmt;

use crate::annotation::ClassValue;

use super::{safe_ratio, ConfusionCounts, MetricsError};

const DIGITS: usize = 4;
const LONGEST_HEADING: &str = "weighted avg";

/// Scores for one class, or one averaged row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build the report for classes `no` and `yes`.
    pub fn new(gold: &[ClassValue], predicted: &[ClassValue]) -> Result<Self, MetricsError> {
        if gold.len() != predicted.len() {
            return Err(MetricsError::LengthMismatch {
                gold: gold.len(),
                predicted: predicted.len(),
            });
        }

        let classes: Vec<ClassMetrics> = [ClassValue::No, ClassValue::Yes]
            .into_iter()
            .map(|class| {
                let counts = ConfusionCounts::for_class(gold, predicted, class);
                ClassMetrics {
                    name: class.to_string(),
                    precision: counts.precision(),
                    recall: counts.recall(),
                    f1: counts.f1(),
                    support: gold.iter().filter(|&&g| g == class).count(),
                }
            })
            .collect();

        let total = gold.len();
        let correct = gold.iter().zip(predicted).filter(|(g, p)| g == p).count();

        let macro_avg = average_row("macro avg", &classes, |_| 1.0);
        let weighted_avg = average_row("weighted avg", &classes, |c| c.support as f64);

        Ok(Self {
            classes,
            accuracy: safe_ratio(correct as f64, total as f64),
            macro_avg,
            weighted_avg,
        })
    }

    fn total_support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }
}

fn average_row(
    name: &str,
    classes: &[ClassMetrics],
    weight: impl Fn(&ClassMetrics) -> f64,
) -> ClassMetrics {
    let total_weight: f64 = classes.iter().map(&weight).sum();
    let weighted = |score: fn(&ClassMetrics) -> f64| {
        safe_ratio(
            classes.iter().map(|c| score(c) * weight(c)).sum(),
            total_weight,
        )
    };

    ClassMetrics {
        name: name.to_string(),
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
        support: classes.iter().map(|c| c.support).sum(),
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .chain([LONGEST_HEADING.len(), DIGITS])
            .max()
            .unwrap_or(LONGEST_HEADING.len());

        write!(f, "{:>width$} ", "")?;
        for header in ["precision", "recall", "f1-score", "support"] {
            write!(f, " {:>9}", header)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for row in &self.classes {
            write_row(f, row, width)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.prec$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support(),
            prec = DIGITS
        )?;
        write_row(f, &self.macro_avg, width)?;
        write_row(f, &self.weighted_avg, width)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &ClassMetrics, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.prec$} {:>9.prec$} {:>9.prec$} {:>9}",
        row.name,
        row.precision,
        row.recall,
        row.f1,
        row.support,
        prec = DIGITS
    )
}
