//! # Error Types
//!
//! [`SchemaBuildError`] is the startup-time failure: a declaration that
//! cannot be compiled. It is fatal and never surfaces per request.
//!
//! [`ExtractError`] is the per-request failure of turning raw body bytes into
//! a value. It is reported separately from schema violations.

use thiserror::Error;

use crate::translate::Location;

/// A declaration that cannot be compiled into a schema.
#[derive(Error, Debug)]
pub enum SchemaBuildError {
    /// A field or parameter carries constraints that contradict its type.
    #[error("{endpoint}: {location} field '{field}': {reason}")]
    InvalidDeclaration {
        /// `METHOD /template` of the offending endpoint.
        endpoint: String,
        /// Location the field belongs to.
        location: Location,
        /// Dotted field path, or the parameter name.
        field: String,
        /// What is wrong.
        reason: String,
    },

    /// Two parameters with the same name in one location.
    #[error("{endpoint}: duplicate {location} parameter '{name}'")]
    DuplicateParameter {
        endpoint: String,
        location: Location,
        name: String,
    },

    /// A path parameter that the route template never binds.
    #[error("{endpoint}: path parameter '{name}' does not appear in the route template")]
    UnknownPathParameter { endpoint: String, name: String },

    /// The same (method, template) declared twice.
    #[error("duplicate endpoint declaration: {endpoint}")]
    DuplicateEndpoint { endpoint: String },

    /// The structural evaluator refused the generated schema
    /// (for example, an invalid regular expression).
    #[error("{endpoint}: {location} schema rejected by evaluator: {reason}")]
    Evaluator {
        endpoint: String,
        location: Location,
        reason: String,
    },
}

/// Failure to decode a request location into a value.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The body bytes are not JSON.
    #[error("malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// An unrecognised [`MalformedBodyPolicy`](crate::MalformedBodyPolicy) name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown malformed-body policy '{0}' (expected 'reject' or 'pass-through')")]
pub struct UnknownPolicy(pub String);
