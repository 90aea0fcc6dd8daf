#![deny(missing_docs)]

//! # reqguard-core — Declaration Model
//!
//! The leaf of the reqguard dependency graph. Defines how an API surface is
//! *declared*: endpoints, their path/query parameters, a recursive body type
//! descriptor, and an explicit, enumerated constraint set per field.
//!
//! ## Key Design Principles
//!
//! 1. **Constraints are data, not metadata strings.** Every constraint a
//!    field can carry is a typed member of [`Constraints`]. Nothing is
//!    discovered by introspection at request time.
//!
//! 2. **Declarations are immutable.** An [`ApiDescription`] is loaded once
//!    (YAML, JSON, or the builder API) and handed to the schema compiler.
//!
//! 3. **One value type.** Decoded request values are `serde_json::Value`
//!    everywhere; [`ValueKind`] gives explicit kind discrimination.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `reqguard-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod decl;
pub mod endpoint;
pub mod error;
pub mod method;
pub mod path;
pub mod value;

pub use decl::{BodyDecl, Constraints, FieldDecl, ParamLocation, ParamType, ParameterDecl, TypeDecl};
pub use endpoint::{ApiDescription, EndpointSpec};
pub use error::DeclarationError;
pub use method::HttpMethod;
pub use path::{canonical_route, FieldPath, PathSegment, PathTemplate};
pub use value::ValueKind;
