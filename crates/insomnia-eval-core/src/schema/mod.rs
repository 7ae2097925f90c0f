//! Schema validation for annotation documents.
//!
//! Documents are checked in two passes: a JSON Schema pass over the
//! top-level shape, then a per-record pass that enforces the label
//! contracts and normalizes class values.

mod shape;
mod validator;

pub use shape::check_document_shape;
pub use validator::{SchemaError, SchemaValidator, ValidationError, ValidationMode};
