//! # Error Translation
//!
//! Maps raw violations to the caller-facing vocabulary. The wording of every
//! message is part of the observable contract.
//!
//! | keyword | message |
//! |---|---|
//! | type | `Invalid type. Expected: {expected}, given: {actual}` |
//! | format | `Does not match format '{format}'` |
//! | minLength | `String length must be greater than or equal to {min}` |
//! | maxLength | `String length must be less than or equal to {max}` |
//! | pattern | `Does not match pattern '{pattern}'` |
//! | enum | `{path} must be one of the following: "A", "B"` |
//! | minimum | `Must be greater than or equal to {min}` / `Must be greater than {min}` |
//! | maximum | `Must be less than or equal to {max}` / `Must be less than {max}` |
//! | required | `Is required` |
//!
//! ## Field keys
//!
//! Body violations are keyed `body.<path>` (`body` alone at the root).
//! Path and query violations are keyed by the bare parameter path with no
//! location prefix.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use reqguard_core::FieldPath;

use crate::validate::{Keyword, RawViolation};

/// Message for a body that is not JSON, under the rejecting policy.
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed JSON body";

/// One of the three places a request is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("path"),
            Self::Query => f.write_str("query"),
            Self::Body => f.write_str("body"),
        }
    }
}

/// A translated violation: final field key and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Path → message map for one request. Empty means the request passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult(BTreeMap<String, String>);

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pass(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record an error unless its field already has one.
    pub fn insert(&mut self, error: FieldError) {
        self.0.entry(error.field).or_insert(error.message);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        for error in errors {
            self.insert(error);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn into_details(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// The JSON body of a rejection: `{"details": {<field>: <message>}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionBody {
    pub details: ValidationResult,
}

/// Stateless translator from raw violations to field errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Final key for a violation at `path` within `location`.
    pub fn field_key(location: Location, path: &FieldPath) -> String {
        match location {
            Location::Body if path.is_root() => "body".to_string(),
            Location::Body => format!("body.{path}"),
            Location::Path | Location::Query => path.to_string(),
        }
    }

    /// Message for `keyword`, given the already-prefixed field key.
    pub fn message(field: &str, keyword: &Keyword) -> String {
        match keyword {
            Keyword::Type { expected, given } => {
                format!("Invalid type. Expected: {expected}, given: {given}")
            }
            Keyword::Format { format } => format!("Does not match format '{format}'"),
            Keyword::MinLength { limit } => {
                format!("String length must be greater than or equal to {limit}")
            }
            Keyword::MaxLength { limit } => {
                format!("String length must be less than or equal to {limit}")
            }
            Keyword::Pattern { pattern } => format!("Does not match pattern '{pattern}'"),
            Keyword::Enum { options } => {
                let allowed = options.iter().map(quote).collect::<Vec<_>>().join(", ");
                format!("{field} must be one of the following: {allowed}")
            }
            Keyword::Minimum { limit, exclusive: false } => {
                format!("Must be greater than or equal to {limit}")
            }
            Keyword::Minimum { limit, exclusive: true } => format!("Must be greater than {limit}"),
            Keyword::Maximum { limit, exclusive: false } => {
                format!("Must be less than or equal to {limit}")
            }
            Keyword::Maximum { limit, exclusive: true } => format!("Must be less than {limit}"),
            Keyword::Required => "Is required".to_string(),
        }
    }

    pub fn translate_one(location: Location, violation: &RawViolation) -> FieldError {
        let field = Self::field_key(location, &violation.path);
        let message = Self::message(&field, &violation.keyword);
        FieldError { field, message }
    }

    /// Translate violations in order.
    pub fn translate(location: Location, violations: &[RawViolation]) -> Vec<FieldError> {
        violations
            .iter()
            .map(|v| Self::translate_one(location, v))
            .collect()
    }
}

fn quote(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => format!("\"{other}\""),
    }
}
