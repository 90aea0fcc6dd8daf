//! # Request Extraction
//!
//! Turns the raw pieces of an inbound request into the three instances the
//! validator compares against: a path object, a query object, and the
//! decoded body.
//!
//! Path and query values arrive as strings. They are coerced toward the
//! declared parameter type only when they parse cleanly; anything else
//! stays a string so the evaluator reports the type mismatch.

use serde_json::{Map, Number, Value};

use reqguard_core::HttpMethod;

use crate::error::ExtractError;
use crate::schema::SchemaNode;

/// The framework-independent view of a request handed to the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub method: HttpMethod,
    /// Matched route template, in `{name}` or `:name` spelling.
    pub route: &'a str,
    /// Placeholder name and raw (already percent-decoded) segment.
    pub path_params: &'a [(&'a str, &'a str)],
    /// Raw query string without the leading `?`.
    pub query: Option<&'a str>,
    pub body: &'a [u8],
}

/// Stateless extraction of request locations into JSON instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestExtractor;

impl RequestExtractor {
    /// Path instance: one property per placeholder.
    pub fn path_instance(params: &[(&str, &str)], schema: &SchemaNode) -> Value {
        let mut object = Map::new();
        for (name, raw) in params {
            object.insert((*name).to_string(), Value::String((*raw).to_string()));
        }
        coerce_params(object, schema)
    }

    /// Query instance: a repeated key becomes an ordered list of strings.
    pub fn query_instance(query: Option<&str>, schema: &SchemaNode) -> Value {
        let mut object = Map::new();
        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            let value = Value::String(value.into_owned());
            match object.get_mut(&*key) {
                None => {
                    object.insert(key.into_owned(), value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        coerce_params(object, schema)
    }

    /// Decode the body. Empty or whitespace-only bytes mean "no body".
    pub fn body_instance(body: &[u8]) -> Result<Option<Value>, ExtractError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(body)?))
    }
}

fn coerce_params(mut object: Map<String, Value>, schema: &SchemaNode) -> Value {
    if let Some(declared) = schema.as_object() {
        for (name, node) in &declared.properties {
            if let Some(value) = object.get_mut(name) {
                *value = coerce(value.take(), node);
            }
        }
    }
    Value::Object(object)
}

/// Coerce one raw parameter value toward `node`'s type.
fn coerce(value: Value, node: &SchemaNode) -> Value {
    match (node, value) {
        (SchemaNode::Array(array), Value::Array(values)) => Value::Array(
            values
                .into_iter()
                .map(|v| coerce(v, &array.items))
                .collect(),
        ),
        (SchemaNode::Array(array), single) => Value::Array(vec![coerce(single, &array.items)]),
        (SchemaNode::Number(n), Value::String(raw)) => {
            parse_number(&raw, n.integer).unwrap_or(Value::String(raw))
        }
        (SchemaNode::Boolean, Value::String(raw)) => match raw.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw),
        },
        (_, value) => value,
    }
}

fn parse_number(raw: &str, integer: bool) -> Option<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Some(Value::Number(u.into()));
    }
    if integer {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
