//! # Endpoints & API Descriptions
//!
//! An [`ApiDescription`] is the ordered list of declared endpoints handed to
//! the schema compiler at startup. It can be built in code or loaded from a
//! YAML/JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decl::{BodyDecl, ParamLocation, ParameterDecl};
use crate::error::DeclarationError;
use crate::method::HttpMethod;
use crate::path::PathTemplate;

/// One declared (method, path template) pair with its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Request method.
    pub method: HttpMethod,
    /// Route template, as mounted on the router.
    pub path: PathTemplate,
    /// One-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Path and query parameters, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
    /// Request body, if the endpoint takes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyDecl>,
}

impl EndpointSpec {
    /// An endpoint with nothing declared yet.
    pub fn new(method: HttpMethod, path: PathTemplate) -> Self {
        Self {
            method,
            path,
            summary: None,
            parameters: Vec::new(),
            body: None,
        }
    }

    /// Set the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Add a parameter.
    pub fn param(mut self, param: ParameterDecl) -> Self {
        self.parameters.push(param);
        self
    }

    /// Declare the body.
    pub fn body(mut self, body: BodyDecl) -> Self {
        self.body = Some(body);
        self
    }

    /// Declared parameters for one location, in declared order.
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParameterDecl> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// Label like `"POST /things/{id}"` for logs and build errors.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Ordered endpoint declarations for one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDescription {
    /// Service name, informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Declared endpoints, compiled in this order.
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,
}

impl ApiDescription {
    /// An untitled description of `endpoints`.
    pub fn new(endpoints: impl IntoIterator<Item = EndpointSpec>) -> Self {
        Self {
            title: None,
            endpoints: endpoints.into_iter().collect(),
        }
    }

    /// Load a description from disk.
    ///
    /// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeclarationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let source_name = path.display().to_string();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&content, &source_name)
        } else {
            Self::from_json_str(&content, &source_name)
        }
    }

    /// Parse a YAML document. `source_name` labels parse errors.
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, DeclarationError> {
        serde_yaml::from_str(content).map_err(|e| DeclarationError::Parse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse a JSON document. `source_name` labels parse errors.
    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, DeclarationError> {
        serde_json::from_str(content).map_err(|e| DeclarationError::Parse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }
}
