//! # Validate Subcommand
//!
//! Runs one request through the same dispatcher the server uses, without a
//! network listener. The request is described by its endpoint, its path
//! parameter values, a raw query string, and an optional body file.
//!
//! ```bash
//! reqguard validate api.yaml --method POST --path '/pets/{id}' \
//!     --param id=7 --query 'tag=a&tag=b' --body pet.json
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use reqguard_core::HttpMethod;
use reqguard_schema::{Dispatcher, MalformedBodyPolicy, Outcome, RequestParts, SchemaCache};

/// Arguments for the `reqguard validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// API description file (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// HTTP method of the request.
    #[arg(long)]
    pub method: HttpMethod,

    /// Route template the request matched, e.g. `/pets/{id}`.
    #[arg(long)]
    pub path: String,

    /// Path parameter value as NAME=VALUE. Repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Raw query string, without the leading `?`.
    #[arg(long)]
    pub query: Option<String>,

    /// File holding the request body. `-` reads stdin.
    #[arg(long, value_name = "FILE")]
    pub body: Option<PathBuf>,

    /// Let bodies that are not valid JSON through instead of rejecting them.
    #[arg(long)]
    pub pass_through_malformed: bool,
}

/// Execute the validate subcommand.
///
/// Prints `PASS` or the rejection body. Returns exit code: 0 when the
/// request passes, 1 when it is rejected or the description fails to compile.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let api = crate::load_description(&args.file)?;
    let cache = match SchemaCache::build_all(&api) {
        Ok(cache) => cache,
        Err(e) => {
            println!("FAIL: {e}");
            return Ok(1);
        }
    };

    let policy = if args.pass_through_malformed {
        MalformedBodyPolicy::PassThrough
    } else {
        MalformedBodyPolicy::Reject
    };
    let dispatcher = Dispatcher::new(cache.into()).with_malformed_body(policy);

    let params = parse_params(&args.params)?;
    let borrowed: Vec<(&str, &str)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    let body = read_body(args.body.as_ref())?;

    if dispatcher.cache().lookup(args.method, &args.path).is_none() {
        tracing::warn!(method = %args.method, path = %args.path, "no endpoint declared; nothing to validate");
    }

    let outcome = dispatcher.check(&RequestParts {
        method: args.method,
        route: &args.path,
        path_params: &borrowed,
        query: args.query.as_deref(),
        body: &body,
    });

    match outcome.into_rejection() {
        None => {
            println!("PASS");
            Ok(0)
        }
        Some(rejection) => {
            println!("{}", serde_json::to_string_pretty(&rejection)?);
            Ok(1)
        }
    }
}

/// Split each `NAME=VALUE` at the first `=`.
fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => bail!("path parameter must be NAME=VALUE, got {pair:?}"),
        })
        .collect()
}

fn read_body(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        None => Ok(Vec::new()),
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = Vec::new();
            std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)
                .context("failed to read body from stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read body file {}", path.display())),
    }
}
