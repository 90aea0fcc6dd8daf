//! # Schema Builder
//!
//! Compiles declarations into [`SchemaNode`] trees.
//!
//! - [`build_body_schema`] walks a recursive [`TypeDecl`]: objects recurse
//!   into their fields, arrays recurse into their element type, leaves take
//!   their declared constraints.
//! - [`build_param_schema`] turns the path or query parameters of one
//!   endpoint into a single object schema, one property per parameter.
//!
//! Every leaf gets a `type` even when it carries no constraints, so a type
//! mismatch is always detectable.
//!
//! Constraints declared on an array site are moved onto its element type.
//! They never constrain the array itself.

use std::collections::HashSet;

use serde_json::Value;

use reqguard_core::{Constraints, FieldPath, ParamType, ParameterDecl, TypeDecl};

use crate::schema::{ArraySchema, Bound, NumberSchema, ObjectSchema, SchemaNode, StringSchema};

/// A declaration problem found while building, before endpoint context is
/// attached.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildIssue {
    /// Where in the declaration the problem sits.
    pub field: FieldPath,
    pub reason: String,
}

impl BuildIssue {
    fn new(field: &FieldPath, reason: impl Into<String>) -> Self {
        Self {
            field: field.clone(),
            reason: reason.into(),
        }
    }
}

/// Build the schema for a request body type.
pub fn build_body_schema(decl: &TypeDecl) -> Result<SchemaNode, BuildIssue> {
    build_node(decl, &FieldPath::root())
}

/// Build the object schema for one location's parameters.
///
/// Parameters must be scalars or arrays of scalars.
pub fn build_param_schema<'a>(
    params: impl IntoIterator<Item = &'a ParameterDecl>,
) -> Result<SchemaNode, BuildIssue> {
    let mut object = ObjectSchema::default();
    let mut seen = HashSet::new();

    for param in params {
        let at = FieldPath::root().key(&param.name);
        if !seen.insert(param.name.as_str()) {
            return Err(BuildIssue::new(&at, "declared more than once"));
        }
        let element = match (&param.schema.kind, &param.schema.items) {
            (ParamType::Array, Some(items)) => items.kind,
            (kind, _) => *kind,
        };
        if !element.is_scalar() {
            return Err(BuildIssue::new(
                &at,
                format!("parameters must be scalars or arrays of scalars, not {element}"),
            ));
        }

        object
            .properties
            .push((param.name.clone(), build_node(&param.schema, &at)?));
        if param.required {
            object.required.push(param.name.clone());
        }
    }

    Ok(SchemaNode::Object(object))
}

fn build_node(decl: &TypeDecl, at: &FieldPath) -> Result<SchemaNode, BuildIssue> {
    let constraints = &decl.constraints;
    match decl.kind {
        ParamType::Object => {
            if !constraints.is_empty() {
                return Err(BuildIssue::new(at, "object declarations take no constraints"));
            }
            let mut object = ObjectSchema::default();
            let mut seen = HashSet::new();
            for field in &decl.fields {
                let child = at.key(&field.name);
                if !seen.insert(field.name.as_str()) {
                    return Err(BuildIssue::new(&child, "declared more than once"));
                }
                object
                    .properties
                    .push((field.name.clone(), build_node(&field.schema, &child)?));
                if field.required {
                    object.required.push(field.name.clone());
                }
            }
            Ok(SchemaNode::Object(object))
        }
        ParamType::Array => {
            let items = decl
                .items
                .as_deref()
                .ok_or_else(|| BuildIssue::new(at, "array declarations need an element type"))?;
            let element = TypeDecl {
                constraints: items.constraints.clone().or(constraints),
                ..items.clone()
            };
            Ok(SchemaNode::Array(ArraySchema {
                items: Box::new(build_node(&element, at)?),
            }))
        }
        ParamType::String => {
            if constraints.has_numeric_bounds() {
                return Err(BuildIssue::new(at, "numeric bounds on a string"));
            }
            check_lengths(constraints, at)?;
            check_enum(constraints, at, "string", Value::is_string)?;
            Ok(SchemaNode::String(StringSchema {
                format: constraints.format.clone(),
                min_length: constraints.min_length,
                max_length: constraints.max_length,
                pattern: constraints.pattern.clone(),
                enum_values: constraints.enum_values.clone(),
            }))
        }
        ParamType::Integer | ParamType::Number => {
            let integer = decl.kind == ParamType::Integer;
            // `format` on numbers is descriptive only (int32, double).
            if constraints.min_length.is_some()
                || constraints.max_length.is_some()
                || constraints.pattern.is_some()
            {
                return Err(BuildIssue::new(at, "string constraints on a number"));
            }
            check_bounds(constraints, at)?;
            if integer {
                check_enum(constraints, at, "integer", |v| v.is_i64() || v.is_u64())?;
            } else {
                check_enum(constraints, at, "number", Value::is_number)?;
            }
            Ok(SchemaNode::Number(NumberSchema {
                integer,
                minimum: constraints.minimum.clone().map(|limit| Bound {
                    limit,
                    exclusive: constraints.exclusive_minimum,
                }),
                maximum: constraints.maximum.clone().map(|limit| Bound {
                    limit,
                    exclusive: constraints.exclusive_maximum,
                }),
                enum_values: constraints.enum_values.clone(),
            }))
        }
        ParamType::Boolean => {
            if !constraints.is_empty() {
                return Err(BuildIssue::new(at, "boolean declarations take no constraints"));
            }
            Ok(SchemaNode::Boolean)
        }
        ParamType::Any => {
            if !constraints.is_empty() {
                return Err(BuildIssue::new(at, "untyped declarations take no constraints"));
            }
            Ok(SchemaNode::Any)
        }
    }
}

fn check_lengths(constraints: &Constraints, at: &FieldPath) -> Result<(), BuildIssue> {
    if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
        if min > max {
            return Err(BuildIssue::new(
                at,
                format!("min_length {min} exceeds max_length {max}"),
            ));
        }
    }
    Ok(())
}

fn check_bounds(constraints: &Constraints, at: &FieldPath) -> Result<(), BuildIssue> {
    if let (Some(min), Some(max)) = (&constraints.minimum, &constraints.maximum) {
        let (lo, hi) = (min.as_f64(), max.as_f64());
        if let (Some(lo), Some(hi)) = (lo, hi) {
            if lo > hi {
                return Err(BuildIssue::new(
                    at,
                    format!("minimum {min} exceeds maximum {max}"),
                ));
            }
        }
    }
    Ok(())
}

fn check_enum(
    constraints: &Constraints,
    at: &FieldPath,
    kind: &str,
    accepts: impl Fn(&Value) -> bool,
) -> Result<(), BuildIssue> {
    let Some(values) = &constraints.enum_values else {
        return Ok(());
    };
    if values.is_empty() {
        return Err(BuildIssue::new(at, "enum needs at least one value"));
    }
    if let Some(bad) = values.iter().find(|&v| !accepts(v)) {
        return Err(BuildIssue::new(
            at,
            format!("enum value {bad} is not a {kind}"),
        ));
    }
    Ok(())
}
