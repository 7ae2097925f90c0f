//! Per-record validation of annotation documents.
//!
//! Iteration is note IDs in source order, then labels in label-set order.
//! In fail-fast mode the first offending (note, label) pair stops
//! validation. Labels not in the task's label set are ignored.

use serde_json::{Map, Value};
use tracing::debug;

use crate::annotation::{AnnotationSet, ClassValue, DocumentRole, Evidence, Record};
use crate::task::LabelSet;

use super::shape::check_document_shape;

/// Keys an evidence object must carry.
const LABEL_KEY: &str = "label";
const TEXT_KEY: &str = "text";

/// A single schema violation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Malformed {role} document: {}", .details.join("; "))]
    InvalidDocument {
        role: DocumentRole,
        details: Vec<String>,
    },

    #[error("Missing '{label}' label for note {id} in {role}")]
    MissingLabel {
        role: DocumentRole,
        id: String,
        label: String,
    },

    #[error("Incorrect value for '{label}' label at note {id} in {role}: {raw}. Expected 'yes' or 'no'.")]
    InvalidLabelValue {
        role: DocumentRole,
        id: String,
        label: String,
        raw: String,
    },

    #[error("Incorrect format for '{label}' label at note {id} in {role}: {raw}. Expected object with 'label' and 'text' keys.")]
    InvalidEvidenceFormat {
        role: DocumentRole,
        id: String,
        label: String,
        raw: String,
    },

    #[error("Missing '{key}' key in '{label}' for note {id} in {role}")]
    MissingEvidenceKey {
        role: DocumentRole,
        id: String,
        label: String,
        key: String,
    },

    #[error("Unexpected '{key}' key in '{label}' for note {id} in {role}. Expected only 'label' and 'text'.")]
    UnexpectedEvidenceKey {
        role: DocumentRole,
        id: String,
        label: String,
        key: String,
    },

    #[error("Incorrect 'text' format for '{label}' at note {id} in {role}: {raw}. Expected list of strings.")]
    InvalidTextFormat {
        role: DocumentRole,
        id: String,
        label: String,
        raw: String,
    },

    #[error("'text' list of length {text_len} contradicts label '{class}' for '{label}' at note {id} in {role}. Expected {}.", expected_text(.class))]
    TextLabelMismatch {
        role: DocumentRole,
        id: String,
        label: String,
        class: ClassValue,
        text_len: usize,
    },
}

fn expected_text(class: &ClassValue) -> &'static str {
    match class {
        ClassValue::Yes => "non-empty list",
        ClassValue::No => "empty list",
    }
}

/// Validation failure: a single error, or every error in aggregate mode.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{} schema errors found:\n{}", .0.len(), render_all(.0))]
    Aggregate(Vec<SchemaError>),
}

impl ValidationError {
    /// All underlying schema errors, in discovery order.
    pub fn errors(&self) -> Vec<&SchemaError> {
        match self {
            Self::Schema(e) => vec![e],
            Self::Aggregate(errors) => errors.iter().collect(),
        }
    }
}

fn render_all(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// How many errors to collect before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first offending record.
    #[default]
    FailFast,
    /// Report every offending (note, label) pair.
    Aggregate,
}

/// Validates one annotation document against a label set.
pub struct SchemaValidator<'a> {
    labels: &'a LabelSet,
    role: DocumentRole,
    mode: ValidationMode,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(labels: &'a LabelSet, role: DocumentRole) -> Self {
        Self {
            labels,
            role,
            mode: ValidationMode::FailFast,
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validate a label-only document (`"<Label>": "yes" | "no"`).
    pub fn validate_simple(
        &self,
        document: &Value,
    ) -> Result<AnnotationSet<ClassValue>, ValidationError> {
        self.validate_with(document, |id, label, raw| self.parse_class(id, label, raw))
    }

    /// Validate an evidence document (`"<Label>": {"label": ..., "text": [...]}`).
    pub fn validate_evidence(
        &self,
        document: &Value,
    ) -> Result<AnnotationSet<Evidence>, ValidationError> {
        self.validate_with(document, |id, label, raw| self.parse_evidence(id, label, raw))
    }

    fn validate_with<V, F>(&self, document: &Value, parse: F) -> Result<AnnotationSet<V>, ValidationError>
    where
        F: Fn(&str, &str, &Value) -> Result<V, SchemaError>,
    {
        check_document_shape(document, self.role)?;
        let notes = self.as_object(document)?;

        let mut validated = AnnotationSet::with_capacity(notes.len());
        let mut errors = Vec::new();

        for (id, content) in notes {
            let fields = self.as_object(content)?;
            let mut values = Vec::with_capacity(self.labels.len());

            for label in self.labels.iter() {
                let parsed = match fields.get(label) {
                    Some(raw) => parse(id.as_str(), label, raw),
                    None => Err(SchemaError::MissingLabel {
                        role: self.role,
                        id: id.clone(),
                        label: label.to_string(),
                    }),
                };

                match parsed {
                    Ok(value) => values.push((label.to_string(), value)),
                    Err(e) if self.mode == ValidationMode::FailFast => return Err(e.into()),
                    Err(e) => errors.push(e),
                }
            }

            if values.len() == self.labels.len() {
                validated.insert(id.clone(), Record::new(values));
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::Aggregate(errors));
        }

        debug!(
            role = %self.role,
            notes = validated.len(),
            labels = self.labels.len(),
            "document validated"
        );
        Ok(validated)
    }

    /// The shape check guarantees objects; this keeps the walk total anyway.
    fn as_object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>, SchemaError> {
        value.as_object().ok_or_else(|| SchemaError::InvalidDocument {
            role: self.role,
            details: vec![format!("expected object, found {}", value)],
        })
    }

    fn parse_class(&self, id: &str, label: &str, raw: &Value) -> Result<ClassValue, SchemaError> {
        raw.as_str()
            .and_then(ClassValue::parse)
            .ok_or_else(|| SchemaError::InvalidLabelValue {
                role: self.role,
                id: id.to_string(),
                label: label.to_string(),
                raw: raw_display(raw),
            })
    }

    fn parse_evidence(&self, id: &str, label: &str, raw: &Value) -> Result<Evidence, SchemaError> {
        let fields = raw.as_object().ok_or_else(|| SchemaError::InvalidEvidenceFormat {
            role: self.role,
            id: id.to_string(),
            label: label.to_string(),
            raw: raw_display(raw),
        })?;

        let class_raw = fields
            .get(LABEL_KEY)
            .ok_or_else(|| self.missing_key(id, label, LABEL_KEY))?;
        let class = self.parse_class(id, label, class_raw)?;

        let text_raw = fields
            .get(TEXT_KEY)
            .ok_or_else(|| self.missing_key(id, label, TEXT_KEY))?;
        let text = self.parse_text(id, label, text_raw)?;

        if let Some(extra) = fields.keys().find(|k| *k != LABEL_KEY && *k != TEXT_KEY) {
            return Err(SchemaError::UnexpectedEvidenceKey {
                role: self.role,
                id: id.to_string(),
                label: label.to_string(),
                key: extra.clone(),
            });
        }

        let consistent = match class {
            ClassValue::Yes => !text.is_empty(),
            ClassValue::No => text.is_empty(),
        };
        if !consistent {
            return Err(SchemaError::TextLabelMismatch {
                role: self.role,
                id: id.to_string(),
                label: label.to_string(),
                class,
                text_len: text.len(),
            });
        }

        Ok(Evidence { label: class, text })
    }

    fn parse_text(&self, id: &str, label: &str, raw: &Value) -> Result<Vec<String>, SchemaError> {
        let invalid = || SchemaError::InvalidTextFormat {
            role: self.role,
            id: id.to_string(),
            label: label.to_string(),
            raw: raw_display(raw),
        };

        raw.as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|span| span.as_str().map(str::to_string).ok_or_else(invalid))
            .collect()
    }

    fn missing_key(&self, id: &str, label: &str, key: &str) -> SchemaError {
        SchemaError::MissingEvidenceKey {
            role: self.role,
            id: id.to_string(),
            label: label.to_string(),
            key: key.to_string(),
        }
    }
}

/// Strings are shown bare, everything else as JSON.
fn raw_display(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
