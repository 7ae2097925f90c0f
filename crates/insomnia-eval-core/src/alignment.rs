//! Alignment of predictions to the gold standard.
//!
//! Scoring iterates gold note IDs only, so every one of them must have a
//! prediction. Extra predictions are ignored.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use crate::annotation::{AnnotationSet, Record};

/// Errors from aligning the two annotation sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Missing the following note IDs in predictions: {}", .0.join(", "))]
    MissingPredictions(Vec<String>),
}

/// A gold record and its prediction.
#[derive(Debug, Clone, Copy)]
pub struct AlignedPair<'a, V> {
    pub id: &'a str,
    pub gold: &'a Record<V>,
    pub predicted: &'a Record<V>,
}

/// Check that every gold note ID has a prediction.
///
/// Lists every missing ID, sorted, rather than stopping at the first.
pub fn check_alignment<V>(
    gold: &AnnotationSet<V>,
    predictions: &AnnotationSet<V>,
) -> Result<(), AlignmentError> {
    let missing: BTreeSet<&str> = gold.ids().filter(|id| !predictions.contains(id)).collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AlignmentError::MissingPredictions(
            missing.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Pair each gold record with its prediction, in gold order.
pub fn align<'a, V>(
    gold: &'a AnnotationSet<V>,
    predictions: &'a AnnotationSet<V>,
) -> Result<Vec<AlignedPair<'a, V>>, AlignmentError> {
    check_alignment(gold, predictions)?;

    let extra = predictions.ids().filter(|id| !gold.contains(id)).count();
    if extra > 0 {
        debug!(extra, "ignoring predictions without a gold record");
    }

    let pairs = gold
        .iter()
        .filter_map(|(id, gold_record)| {
            predictions.get(id).map(|predicted| AlignedPair {
                id,
                gold: gold_record,
                predicted,
            })
        })
        .collect();

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{ClassValue, DocumentRole, SimpleAnnotations};
    use crate::schema::SchemaValidator;
    use crate::task::LabelSet;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    fn annotations(ids: &[&str]) -> SimpleAnnotations {
        let labels = LabelSet::new(["Insomnia"]);
        let mut document = Map::new();
        for id in ids {
            document.insert(id.to_string(), json!({"Insomnia": "yes"}));
        }
        SchemaValidator::new(&labels, DocumentRole::Predictions)
            .validate_simple(&Value::Object(document))
            .unwrap()
    }

    #[test]
    fn test_superset_passes() {
        let gold = annotations(&["n1", "n2"]);
        let predictions = annotations(&["n2", "n1", "n9"]);
        assert!(check_alignment(&gold, &predictions).is_ok());
    }

    #[test]
    fn test_missing_single_id() {
        let gold = annotations(&["n1", "n2", "n3"]);
        let predictions = annotations(&["n1", "n3"]);
        assert_eq!(
            check_alignment(&gold, &predictions),
            Err(AlignmentError::MissingPredictions(vec!["n2".to_string()]))
        );
    }

    #[test]
    fn test_all_missing_ids_listed_sorted() {
        let gold = annotations(&["n9", "n1", "n5", "n2"]);
        let predictions = annotations(&["n1"]);
        let err = check_alignment(&gold, &predictions).unwrap_err();

        assert_eq!(
            err,
            AlignmentError::MissingPredictions(vec![
                "n2".to_string(),
                "n5".to_string(),
                "n9".to_string()
            ])
        );
        assert_eq!(
            err.to_string(),
            "Missing the following note IDs in predictions: n2, n5, n9"
        );
    }

    #[test]
    fn test_align_follows_gold_order_and_drops_extras() {
        let gold = annotations(&["n3", "n1"]);
        let predictions = annotations(&["n1", "n2", "n3"]);
        let pairs = align(&gold, &predictions).unwrap();

        assert_eq!(pairs.iter().map(|p| p.id).collect::<Vec<_>>(), vec!["n3", "n1"]);
        assert_eq!(pairs[0].predicted.get("Insomnia"), Some(&ClassValue::Yes));
    }

    #[test]
    fn test_empty_gold_aligns_trivially() {
        let gold = annotations(&[]);
        let predictions = annotations(&["n1"]);
        assert!(align(&gold, &predictions).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_missing_set_is_exact_difference(
            gold_ids in prop::collection::btree_set("n[0-9]{1,2}", 0..15),
            pred_ids in prop::collection::btree_set("n[0-9]{1,2}", 0..15)
        ) {
            let gold_refs: Vec<&str> = gold_ids.iter().map(String::as_str).collect();
            let pred_refs: Vec<&str> = pred_ids.iter().map(String::as_str).collect();
            let gold = annotations(&gold_refs);
            let predictions = annotations(&pred_refs);

            let expected: Vec<String> = gold_ids.difference(&pred_ids).cloned().collect();
            match check_alignment(&gold, &predictions) {
                Ok(()) => prop_assert!(expected.is_empty()),
                Err(AlignmentError::MissingPredictions(missing)) => prop_assert_eq!(missing, expected),
            }
        }
    }
}
