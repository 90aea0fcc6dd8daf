//! # reqguard-schema — Constraint Compilation & Request Validation
//!
//! Compiles declared endpoint constraints into schema trees once at
//! startup, then validates the path, query, and body of each inbound
//! request against them and reports violations as stable, field-addressed
//! messages.
//!
//! ## Pipeline
//!
//! ```text
//! ApiDescription → builder → SchemaCache          (startup, once)
//! RequestParts → Dispatcher → lookup → extract → validate → translate → Outcome
//! ```
//!
//! - [`builder`] walks declarations into [`SchemaNode`] trees.
//! - [`SchemaCache`] holds the compiled schemas per (method, template).
//! - [`RequestExtractor`] turns raw path segments, query string, and body
//!   bytes into JSON instances, coercing parameter strings where they parse.
//! - [`CompiledSchema::validate`] runs the `jsonschema` evaluator and maps
//!   its errors onto the closed [`Keyword`] set.
//! - [`ErrorTranslator`] renders keys (`body.<path>` for the body, bare
//!   names for path/query) and messages.
//! - [`Dispatcher`] merges all three locations into one [`Outcome`].
//!
//! ## Crate Policy
//!
//! - Depends only on `reqguard-core` internally.
//! - Message wording in [`translate`] is an external contract. Changing a
//!   string is a breaking change for every client that matches on it.
//! - Validation is synchronous and performs no I/O.

pub mod builder;
pub mod cache;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod schema;
pub mod translate;
pub mod validate;

pub use builder::{build_body_schema, build_param_schema, BuildIssue};
pub use cache::{BodySchema, EndpointSchemas, SchemaCache};
pub use dispatch::{Dispatcher, MalformedBodyPolicy, Outcome};
pub use error::{ExtractError, SchemaBuildError, UnknownPolicy};
pub use extract::{RequestExtractor, RequestParts};
pub use schema::SchemaNode;
pub use translate::{
    ErrorTranslator, FieldError, Location, RejectionBody, ValidationResult, MALFORMED_BODY_MESSAGE,
};
pub use validate::{CompiledSchema, Keyword, RawViolation};
