//! Validated annotation records.
//!
//! Everything in this module is produced by the schema validator; holding an
//! `AnnotationSet` means the source document passed validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Binary class value.
///
/// Parsed case-insensitively from `"yes"` / `"no"` and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassValue {
    No,
    Yes,
}

impl ClassValue {
    /// Parse a raw class string, ignoring ASCII case.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("yes") {
            Some(Self::Yes)
        } else if raw.eq_ignore_ascii_case("no") {
            Some(Self::No)
        } else {
            None
        }
    }

    /// 1 for `Yes`, 0 for `No`.
    pub fn as_binary(self) -> u8 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
        }
    }
}

impl fmt::Display for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class value backed by supporting text spans.
///
/// `label == Yes` implies `text` is non-empty; `label == No` implies it is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub label: ClassValue,
    pub text: Vec<String>,
}

impl Evidence {
    /// Spans joined with single spaces, in their original order.
    pub fn joined_text(&self) -> String {
        self.text.join(" ")
    }
}

/// Which document a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    GoldStandard,
    Predictions,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoldStandard => f.write_str("gold standard"),
            Self::Predictions => f.write_str("system predictions"),
        }
    }
}

/// Per-document values, one per task label, in label-set order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V> {
    values: Vec<(String, V)>,
}

pub type SimpleRecord = Record<ClassValue>;
pub type EvidenceRecord = Record<Evidence>;

impl<V> Record<V> {
    pub(crate) fn new(values: Vec<(String, V)>) -> Self {
        Self { values }
    }

    pub fn get(&self, label: &str) -> Option<&V> {
        self.values
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validated documents keyed by note ID, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSet<V> {
    records: Vec<(String, Record<V>)>,
    index: HashMap<String, usize>,
}

pub type SimpleAnnotations = AnnotationSet<ClassValue>;
pub type EvidenceAnnotations = AnnotationSet<Evidence>;

impl<V> Default for AnnotationSet<V> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> AnnotationSet<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a record. A repeated ID replaces the earlier record in place.
    pub(crate) fn insert(&mut self, id: String, record: Record<V>) {
        match self.index.get(&id) {
            Some(&position) => self.records[position].1 = record,
            None => {
                self.index.insert(id.clone(), self.records.len());
                self.records.push((id, record));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Record<V>> {
        self.index.get(id).map(|&position| &self.records[position].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Note IDs in source order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record<V>)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V: Serialize> AnnotationSet<V> {
    /// Render back to the input document shape.
    ///
    /// Class values come out lowercase, so validating the result again
    /// reproduces this set.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut document = Map::with_capacity(self.records.len());
        for (id, record) in &self.records {
            let mut fields = Map::with_capacity(record.len());
            for (label, value) in record.iter() {
                fields.insert(label.to_string(), serde_json::to_value(value)?);
            }
            document.insert(id.clone(), Value::Object(fields));
        }
        Ok(Value::Object(document))
    }
}
