//! # reqguard-cli — CLI Tool for reqguard
//!
//! Provides the `reqguard` command-line interface for working with API
//! descriptions outside a running server.
//!
//! ## Subcommands
//!
//! - `reqguard check` — compile every endpoint and report declaration errors.
//! - `reqguard schema` — print the JSON Schema generated for an endpoint.
//! - `reqguard validate` — run one request through the validator offline.
//!
//! ```bash
//! reqguard check api.yaml
//! reqguard schema api.yaml --method POST --path '/pets/{id}' --location body
//! reqguard validate api.yaml --method GET --path '/pets/{id}' --param id=abc
//! ```
//!
//! Every subcommand exits 0 on success, 1 when the description or request
//! fails, and 2 on operational errors (unreadable files, bad arguments).

pub mod check;
pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use reqguard_core::ApiDescription;

/// Load an API description, attaching the file name to any error.
pub fn load_description(path: &Path) -> Result<ApiDescription> {
    ApiDescription::load(path)
        .with_context(|| format!("failed to load API description {}", path.display()))
}
