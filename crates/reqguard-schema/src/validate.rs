//! # Validation
//!
//! Runs a compiled schema against one request-location instance and yields
//! raw violations in evaluation order.
//!
//! The structural matching itself is delegated to the `jsonschema` crate
//! (Draft 2020-12, format assertion enabled). Its errors are mapped onto the
//! closed [`Keyword`] set; keyword parameters (bounds, enum set, pattern
//! text, expected type) are read back from the schema tree at the
//! violation's path so they are exactly what was declared.
//!
//! ## Type mismatches
//!
//! A type violation at a path suppresses every other violation at that same
//! path. Siblings and ancestors are unaffected.

use std::collections::HashSet;
use std::fmt;

use jsonschema::error::ValidationErrorKind;
use serde_json::{Number, Value};

use reqguard_core::{FieldPath, ValueKind};

use crate::schema::SchemaNode;

/// The closed set of violation keywords, with their parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Type { expected: &'static str, given: ValueKind },
    Format { format: String },
    MinLength { limit: u64 },
    MaxLength { limit: u64 },
    Pattern { pattern: String },
    Enum { options: Vec<Value> },
    Minimum { limit: Number, exclusive: bool },
    Maximum { limit: Number, exclusive: bool },
    Required,
}

impl Keyword {
    /// JSON Schema keyword name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::Format { .. } => "format",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::Pattern { .. } => "pattern",
            Self::Enum { .. } => "enum",
            Self::Minimum { .. } => "minimum",
            Self::Maximum { .. } => "maximum",
            Self::Required => "required",
        }
    }
}

/// A constraint failure before translation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawViolation {
    /// Root-relative path, no location prefix.
    pub path: FieldPath,
    pub keyword: Keyword,
    /// The offending value; `Null` for missing values.
    pub value: Value,
}

impl RawViolation {
    /// A missing required value at `path`.
    pub fn required(path: FieldPath) -> Self {
        Self {
            path,
            keyword: Keyword::Required,
            value: Value::Null,
        }
    }
}

/// A schema tree together with its compiled evaluator.
///
/// Immutable once built; shared read-only across requests.
pub struct CompiledSchema {
    node: SchemaNode,
    document: Value,
    evaluator: jsonschema::Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Render the tree and hand it to the evaluator.
    ///
    /// Returns the evaluator's message if it rejects the document.
    pub fn compile(node: SchemaNode) -> Result<Self, String> {
        let document = node.to_json_schema();
        let evaluator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .should_validate_formats(true)
            .build(&document)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            node,
            document,
            evaluator,
        })
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// The JSON Schema document handed to the evaluator.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate an instance, returning violations in evaluation order.
    pub fn validate(&self, instance: &Value) -> Vec<RawViolation> {
        let mut violations = Vec::new();

        for error in self.evaluator.iter_errors(instance) {
            let at = FieldPath::from_json_pointer(&error.instance_path.to_string());

            if let ValidationErrorKind::Required { property } = &error.kind {
                let name = match property {
                    Value::String(name) => name.clone(),
                    other => other.to_string(),
                };
                violations.push(RawViolation::required(at.key(name)));
                continue;
            }

            let Some(node) = self.node.resolve(&at) else {
                tracing::warn!(path = %at, "violation reported at an undeclared path; dropped");
                continue;
            };

            match keyword_for(&error.kind, node, &error.instance) {
                Some(keyword) => violations.push(RawViolation {
                    path: at,
                    keyword,
                    value: error.instance.clone().into_owned(),
                }),
                None => tracing::warn!(
                    path = %at,
                    error = %error,
                    "evaluator reported a keyword outside the message table; dropped"
                ),
            }
        }

        suppress_after_type_mismatch(violations)
    }
}

/// Pair an evaluator error with the declared parameters at its node.
fn keyword_for(kind: &ValidationErrorKind, node: &SchemaNode, instance: &Value) -> Option<Keyword> {
    let keyword = match (kind, node) {
        (ValidationErrorKind::Type { .. }, _) => Keyword::Type {
            expected: node.type_name()?,
            given: ValueKind::of(instance),
        },
        (ValidationErrorKind::Format { .. }, SchemaNode::String(s)) => Keyword::Format {
            format: s.format.clone()?,
        },
        (ValidationErrorKind::MinLength { .. }, SchemaNode::String(s)) => Keyword::MinLength {
            limit: s.min_length?,
        },
        (ValidationErrorKind::MaxLength { .. }, SchemaNode::String(s)) => Keyword::MaxLength {
            limit: s.max_length?,
        },
        (ValidationErrorKind::Pattern { .. }, SchemaNode::String(s)) => Keyword::Pattern {
            pattern: s.pattern.clone()?,
        },
        (ValidationErrorKind::Enum { .. }, _) => Keyword::Enum {
            options: node.enum_values()?.to_vec(),
        },
        (
            ValidationErrorKind::Minimum { .. } | ValidationErrorKind::ExclusiveMinimum { .. },
            SchemaNode::Number(n),
        ) => {
            let bound = n.minimum.as_ref()?;
            Keyword::Minimum {
                limit: bound.limit.clone(),
                exclusive: bound.exclusive,
            }
        }
        (
            ValidationErrorKind::Maximum { .. } | ValidationErrorKind::ExclusiveMaximum { .. },
            SchemaNode::Number(n),
        ) => {
            let bound = n.maximum.as_ref()?;
            Keyword::Maximum {
                limit: bound.limit.clone(),
                exclusive: bound.exclusive,
            }
        }
        _ => return None,
    };
    Some(keyword)
}

fn suppress_after_type_mismatch(violations: Vec<RawViolation>) -> Vec<RawViolation> {
    let mistyped: HashSet<FieldPath> = violations
        .iter()
        .filter(|v| matches!(v.keyword, Keyword::Type { .. }))
        .map(|v| v.path.clone())
        .collect();

    if mistyped.is_empty() {
        return violations;
    }

    violations
        .into_iter()
        .filter(|v| matches!(v.keyword, Keyword::Type { .. }) || !mistyped.contains(&v.path))
        .collect()
}
