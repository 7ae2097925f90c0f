//! Task configuration.
//!
//! A task fixes the ordered label set, the record variant and the averaging
//! mode. The three shared-task variants are built in; other label sets can be
//! loaded from YAML or JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::metrics::Average;

/// Labels scored in Subtask 1.
pub const SUBTASK_1_LABELS: [&str; 1] = ["Insomnia"];

/// Labels scored in Subtasks 2A and 2B.
pub const SUBTASK_2_LABELS: [&str; 4] = ["Definition 1", "Definition 2", "Rule B", "Rule C"];

/// Errors that can occur when loading a task configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read task config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task config validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Ordered set of label names a task scores.
///
/// Order drives validation (first failing label wins) and the flattening
/// order of multi-label vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }
}

/// Shape of each label value in the annotation documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordVariant {
    /// `"<Label>": "yes" | "no"`
    Simple,
    /// `"<Label>": {"label": "yes" | "no", "text": [...]}`
    Evidence,
}

/// A scoring task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Human-readable name, used in report headings
    pub name: String,

    /// Record variant of both documents
    pub variant: RecordVariant,

    /// Labels to validate and score, in order
    pub labels: LabelSet,

    /// Averaging mode for the classification scorer (ignored for evidence tasks)
    #[serde(default)]
    pub average: Average,
}

impl TaskConfig {
    /// Subtask 1: single-label insomnia detection, binary averaging.
    pub fn subtask1() -> Self {
        Self {
            name: "Subtask 1".to_string(),
            variant: RecordVariant::Simple,
            labels: LabelSet::new(SUBTASK_1_LABELS),
            average: Average::Binary,
        }
    }

    /// Subtask 2A: four sub-criteria, pooled (micro) averaging.
    pub fn subtask2a() -> Self {
        Self {
            name: "Subtask 2A".to_string(),
            variant: RecordVariant::Simple,
            labels: LabelSet::new(SUBTASK_2_LABELS),
            average: Average::Micro,
        }
    }

    /// Subtask 2B: four sub-criteria with evidence spans, scored by ROUGE-L.
    pub fn subtask2b() -> Self {
        Self {
            name: "Subtask 2B".to_string(),
            variant: RecordVariant::Evidence,
            labels: LabelSet::new(SUBTASK_2_LABELS),
            average: Average::Binary,
        }
    }

    /// Parse a task config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: TaskConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a task config from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TaskConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a task config, choosing the parser by file extension.
    ///
    /// `.json` files are parsed as JSON; anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name".to_string()));
        }

        if self.labels.is_empty() {
            return Err(ConfigError::MissingField("labels".to_string()));
        }

        let mut seen = HashSet::new();
        for label in self.labels.iter() {
            if label.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Label names must not be empty".to_string(),
                ));
            }
            if !seen.insert(label) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate label: {}",
                    label
                )));
            }
        }

        Ok(())
    }
}
