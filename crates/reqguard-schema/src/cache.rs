//! # Schema Cache
//!
//! Build-once, read-many registry from (method, route template) to the
//! compiled schemas of that endpoint.
//!
//! The cache has a strict two-phase lifecycle: [`SchemaCache::build_all`]
//! compiles every declared endpoint before serving starts, after which only
//! shared read access is exposed. Wrap it in an `Arc` to share it across
//! request tasks; no locking is involved.

use std::collections::{BTreeMap, HashMap, HashSet};

use reqguard_core::{canonical_route, ApiDescription, EndpointSpec, HttpMethod, ParamLocation};

use crate::builder::{build_body_schema, build_param_schema, BuildIssue};
use crate::error::SchemaBuildError;
use crate::schema::SchemaNode;
use crate::translate::Location;
use crate::validate::CompiledSchema;

/// The compiled body schema and whether a body must be present.
#[derive(Debug)]
pub struct BodySchema {
    pub schema: CompiledSchema,
    pub required: bool,
}

/// Compiled schemas for one endpoint. A location with nothing declared has
/// no schema and is skipped at request time.
#[derive(Debug)]
pub struct EndpointSchemas {
    /// `METHOD /template`, for logs.
    pub label: String,
    pub path: Option<CompiledSchema>,
    pub query: Option<CompiledSchema>,
    pub body: Option<BodySchema>,
}

impl EndpointSchemas {
    /// Compile one endpoint declaration.
    pub fn build(endpoint: &EndpointSpec) -> Result<Self, SchemaBuildError> {
        let label = endpoint.label();

        for param in endpoint.params_in(ParamLocation::Path) {
            if !endpoint.path.placeholders().contains(&param.name) {
                return Err(SchemaBuildError::UnknownPathParameter {
                    endpoint: label,
                    name: param.name.clone(),
                });
            }
        }

        let path = param_schema(endpoint, &label, ParamLocation::Path, Location::Path)?;
        let query = param_schema(endpoint, &label, ParamLocation::Query, Location::Query)?;
        let body = match &endpoint.body {
            Some(decl) => {
                let node = build_body_schema(&decl.schema)
                    .map_err(|issue| invalid(&label, Location::Body, issue))?;
                Some(BodySchema {
                    schema: compile(node, &label, Location::Body)?,
                    required: decl.required,
                })
            }
            None => None,
        };

        Ok(Self {
            label,
            path,
            query,
            body,
        })
    }

    pub fn schema(&self, location: Location) -> Option<&CompiledSchema> {
        match location {
            Location::Path => self.path.as_ref(),
            Location::Query => self.query.as_ref(),
            Location::Body => self.body.as_ref().map(|b| &b.schema),
        }
    }
}

fn param_schema(
    endpoint: &EndpointSpec,
    label: &str,
    declared_in: ParamLocation,
    location: Location,
) -> Result<Option<CompiledSchema>, SchemaBuildError> {
    let mut seen = HashSet::new();
    for param in endpoint.params_in(declared_in) {
        if !seen.insert(param.name.as_str()) {
            return Err(SchemaBuildError::DuplicateParameter {
                endpoint: label.to_string(),
                location,
                name: param.name.clone(),
            });
        }
    }
    if seen.is_empty() {
        return Ok(None);
    }

    let node = build_param_schema(endpoint.params_in(declared_in))
        .map_err(|issue| invalid(label, location, issue))?;
    compile(node, label, location).map(Some)
}

fn compile(
    node: SchemaNode,
    label: &str,
    location: Location,
) -> Result<CompiledSchema, SchemaBuildError> {
    CompiledSchema::compile(node).map_err(|reason| SchemaBuildError::Evaluator {
        endpoint: label.to_string(),
        location,
        reason,
    })
}

fn invalid(label: &str, location: Location, issue: BuildIssue) -> SchemaBuildError {
    let field = if issue.field.is_root() {
        location.to_string()
    } else {
        issue.field.to_string()
    };
    SchemaBuildError::InvalidDeclaration {
        endpoint: label.to_string(),
        location,
        field,
        reason: issue.reason,
    }
}

/// Immutable (method, template) → [`EndpointSchemas`] map.
///
/// Keys use the braced `{name}` template spelling; lookups accept either
/// spelling.
#[derive(Debug, Default)]
pub struct SchemaCache {
    routes: HashMap<String, BTreeMap<HttpMethod, EndpointSchemas>>,
    len: usize,
}

impl SchemaCache {
    /// Compile every endpoint of `api`. Fails on the first bad declaration.
    pub fn build_all(api: &ApiDescription) -> Result<Self, SchemaBuildError> {
        let mut cache = Self::default();

        for endpoint in &api.endpoints {
            let route = endpoint.path.canonical().into_owned();
            let methods = cache.routes.entry(route).or_default();
            if methods.contains_key(&endpoint.method) {
                return Err(SchemaBuildError::DuplicateEndpoint {
                    endpoint: endpoint.label(),
                });
            }
            let schemas = EndpointSchemas::build(endpoint)?;
            tracing::debug!(
                endpoint = %schemas.label,
                path = schemas.path.is_some(),
                query = schemas.query.is_some(),
                body = schemas.body.is_some(),
                "compiled endpoint schemas"
            );
            methods.insert(endpoint.method, schemas);
            cache.len += 1;
        }

        tracing::info!(endpoints = cache.len, "schema cache built");
        Ok(cache)
    }

    /// Schemas for a matched route, or `None` when nothing was declared.
    pub fn lookup(&self, method: HttpMethod, route: &str) -> Option<&EndpointSchemas> {
        self.routes.get(&*canonical_route(route))?.get(&method)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All endpoints, ordered by route then method.
    pub fn iter(&self) -> impl Iterator<Item = (HttpMethod, &str, &EndpointSchemas)> {
        let mut routes: Vec<_> = self.routes.iter().collect();
        routes.sort_by(|a, b| a.0.cmp(b.0));
        routes.into_iter().flat_map(|(route, methods)| {
            methods
                .iter()
                .map(move |(method, schemas)| (*method, route.as_str(), schemas))
        })
    }
}
