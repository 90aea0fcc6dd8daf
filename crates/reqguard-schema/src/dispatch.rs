//! # Dispatcher
//!
//! Per-request orchestration: lookup → extraction → validation →
//! translation → pass or reject.
//!
//! Each declared location is validated independently and all field errors
//! are merged into one [`ValidationResult`]. A failure in one location never
//! suppresses the others. Locations with no declared schema are skipped, and
//! an endpoint with no schemas at all passes unconditionally.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use reqguard_core::FieldPath;

use crate::cache::{EndpointSchemas, SchemaCache};
use crate::error::UnknownPolicy;
use crate::extract::{RequestExtractor, RequestParts};
use crate::translate::{
    ErrorTranslator, FieldError, Location, RejectionBody, ValidationResult, MALFORMED_BODY_MESSAGE,
};
use crate::validate::RawViolation;

/// What to do with body bytes that are not JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedBodyPolicy {
    /// Report `"body": "Malformed JSON body"` alongside any path/query errors.
    #[default]
    Reject,
    /// Skip body validation and leave decoding to the handler.
    PassThrough,
}

impl MalformedBodyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::PassThrough => "pass-through",
        }
    }
}

impl fmt::Display for MalformedBodyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MalformedBodyPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "pass-through" | "passthrough" => Ok(Self::PassThrough),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Result of checking one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Continue to the handler.
    Pass,
    /// Stop the chain and answer 400 with these details.
    Reject(ValidationResult),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// The 400 body, if the request was rejected.
    pub fn into_rejection(self) -> Option<RejectionBody> {
        match self {
            Self::Pass => None,
            Self::Reject(details) => Some(RejectionBody { details }),
        }
    }
}

/// Request validator shared by every request task.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    cache: Arc<SchemaCache>,
    malformed_body: MalformedBodyPolicy,
}

impl Dispatcher {
    pub fn new(cache: Arc<SchemaCache>) -> Self {
        Self {
            cache,
            malformed_body: MalformedBodyPolicy::default(),
        }
    }

    pub fn with_malformed_body(mut self, policy: MalformedBodyPolicy) -> Self {
        self.malformed_body = policy;
        self
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn malformed_body(&self) -> MalformedBodyPolicy {
        self.malformed_body
    }

    /// Validate one request.
    pub fn check(&self, parts: &RequestParts<'_>) -> Outcome {
        let Some(schemas) = self.cache.lookup(parts.method, parts.route) else {
            tracing::trace!(method = %parts.method, route = parts.route, "no schemas declared");
            return Outcome::Pass;
        };

        let result = self.validate(schemas, parts);
        if result.is_pass() {
            tracing::debug!(endpoint = %schemas.label, "request passed validation");
            Outcome::Pass
        } else {
            tracing::info!(
                endpoint = %schemas.label,
                violations = result.len(),
                "request rejected"
            );
            Outcome::Reject(result)
        }
    }

    fn validate(&self, schemas: &EndpointSchemas, parts: &RequestParts<'_>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(schema) = &schemas.path {
            let instance = RequestExtractor::path_instance(parts.path_params, schema.node());
            result.extend(ErrorTranslator::translate(
                Location::Path,
                &schema.validate(&instance),
            ));
        }

        if let Some(schema) = &schemas.query {
            let instance = RequestExtractor::query_instance(parts.query, schema.node());
            result.extend(ErrorTranslator::translate(
                Location::Query,
                &schema.validate(&instance),
            ));
        }

        if let Some(body) = &schemas.body {
            match RequestExtractor::body_instance(parts.body) {
                Ok(Some(instance)) => result.extend(ErrorTranslator::translate(
                    Location::Body,
                    &body.schema.validate(&instance),
                )),
                Ok(None) if body.required => result.insert(ErrorTranslator::translate_one(
                    Location::Body,
                    &RawViolation::required(FieldPath::root()),
                )),
                Ok(None) => {}
                Err(err) => match self.malformed_body {
                    MalformedBodyPolicy::Reject => {
                        tracing::debug!(endpoint = %schemas.label, error = %err, "malformed body");
                        result.insert(FieldError {
                            field: Location::Body.to_string(),
                            message: MALFORMED_BODY_MESSAGE.to_string(),
                        });
                    }
                    MalformedBodyPolicy::PassThrough => {
                        tracing::warn!(
                            endpoint = %schemas.label,
                            error = %err,
                            "malformed body passed through"
                        );
                    }
                },
            }
        }

        result
    }
}
