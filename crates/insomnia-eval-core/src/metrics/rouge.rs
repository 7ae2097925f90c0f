//! ROUGE-L F-measure over evidence spans.
//!
//! For every gold note and label the gold spans and predicted spans are
//! joined and compared by longest common subsequence of tokens. Pairs where
//! both sides are empty are skipped: they are neither a hit nor a miss.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::alignment::AlignedPair;
use crate::annotation::{Evidence, EvidenceRecord};
use crate::task::LabelSet;

use super::{round4, safe_ratio, MetricsError};

lazy_static! {
    /// Runs of characters that never appear inside a token.
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    static ref VALID_TOKEN: Regex = Regex::new(r"^[a-z0-9]+$").unwrap();
}

/// Lowercase, split on anything outside `[a-z0-9]`, no stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|token| VALID_TOKEN.is_match(token))
        .map(str::to_string)
        .collect()
}

/// Length of the longest common subsequence of two token sequences.
pub fn lcs_length(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Two rows of the DP table are enough.
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for token_a in a {
        for (j, token_b) in b.iter().enumerate() {
            current[j + 1] = if token_a == token_b {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// ROUGE-L precision, recall and F-measure for one pair of strings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

/// Score `prediction` against `target`.
///
/// Either side tokenizing to nothing scores 0.
pub fn rouge_l(target: &str, prediction: &str) -> RougeScore {
    let target_tokens = tokenize(target);
    let prediction_tokens = tokenize(prediction);

    if target_tokens.is_empty() || prediction_tokens.is_empty() {
        return RougeScore {
            precision: 0.0,
            recall: 0.0,
            fmeasure: 0.0,
        };
    }

    let lcs = lcs_length(&target_tokens, &prediction_tokens) as f64;
    let precision = lcs / prediction_tokens.len() as f64;
    let recall = lcs / target_tokens.len() as f64;

    RougeScore {
        precision,
        recall,
        fmeasure: safe_ratio(2.0 * precision * recall, precision + recall),
    }
}

/// Average ROUGE-L for one label across the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRouge {
    pub label: String,

    /// Rounded mean, `None` when the label had nothing to score
    pub average: Option<f64>,

    /// Number of (note, label) pairs that were scored
    pub pairs: usize,
}

/// Per-label and overall ROUGE-L averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RougeSummary {
    pub per_label: Vec<LabelRouge>,

    /// Mean of the defined per-label averages, rounded; 0 if none are defined
    pub overall: f64,
}

/// Score every aligned evidence pair and average per label, then across labels.
///
/// Per-label means are averaged unrounded; only the reported values are
/// rounded.
pub fn score_text_overlap(
    pairs: &[AlignedPair<'_, Evidence>],
    labels: &LabelSet,
) -> Result<RougeSummary, MetricsError> {
    let mut scores: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];
    let mut skipped = 0usize;

    for pair in pairs {
        for (slot, label) in scores.iter_mut().zip(labels.iter()) {
            let gold_text = joined(pair.gold, pair.id, label)?;
            let predicted_text = joined(pair.predicted, pair.id, label)?;

            if gold_text.is_empty() && predicted_text.is_empty() {
                skipped += 1;
                continue;
            }

            slot.push(rouge_l(&gold_text, &predicted_text).fmeasure);
        }
    }
    debug!(notes = pairs.len(), skipped, "evidence pairs scored");

    let mut per_label = Vec::with_capacity(labels.len());
    let mut label_means = Vec::new();

    for (label, label_scores) in labels.iter().zip(&scores) {
        let label_mean = mean(label_scores);
        if label_mean.is_none() {
            warn!(label, "no scorable evidence pairs for label");
        }
        label_means.extend(label_mean);
        per_label.push(LabelRouge {
            label: label.to_string(),
            average: label_mean.map(round4),
            pairs: label_scores.len(),
        });
    }

    Ok(RougeSummary {
        per_label,
        overall: round4(mean(&label_means).unwrap_or(0.0)),
    })
}

fn joined(record: &EvidenceRecord, id: &str, label: &str) -> Result<String, MetricsError> {
    record
        .get(label)
        .map(Evidence::joined_text)
        .ok_or_else(|| MetricsError::LabelNotFound {
            id: id.to_string(),
            label: label.to_string(),
        })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
