//! # Schema Subcommand
//!
//! Prints the JSON Schema documents generated for one endpoint, one per
//! location. Useful when a rejection message is surprising and you want to
//! see exactly what the evaluator is checking.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::{Map, Value};

use reqguard_core::HttpMethod;
use reqguard_schema::{Location, SchemaCache};

/// Arguments for the `reqguard schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// API description file (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// HTTP method of the endpoint.
    #[arg(long)]
    pub method: HttpMethod,

    /// Route template of the endpoint, e.g. `/pets/{id}`.
    #[arg(long)]
    pub path: String,

    /// Print only one location.
    #[arg(long, value_enum)]
    pub location: Option<LocationArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationArg {
    Path,
    Query,
    Body,
}

impl From<LocationArg> for Location {
    fn from(arg: LocationArg) -> Self {
        match arg {
            LocationArg::Path => Location::Path,
            LocationArg::Query => Location::Query,
            LocationArg::Body => Location::Body,
        }
    }
}

/// Execute the schema subcommand.
///
/// Returns exit code: 0 when the endpoint exists, 1 when the description
/// fails to compile or the endpoint is not declared.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    let api = crate::load_description(&args.file)?;
    let cache = match SchemaCache::build_all(&api) {
        Ok(cache) => cache,
        Err(e) => {
            println!("FAIL: {e}");
            return Ok(1);
        }
    };

    let Some(schemas) = cache.lookup(args.method, &args.path) else {
        println!("FAIL: no endpoint declared for {} {}", args.method, args.path);
        return Ok(1);
    };

    let locations: Vec<Location> = match args.location {
        Some(location) => vec![location.into()],
        None => vec![Location::Path, Location::Query, Location::Body],
    };

    let mut documents = Map::new();
    for location in locations {
        let document = schemas
            .schema(location)
            .map(|compiled| compiled.document().clone())
            .unwrap_or(Value::Null);
        documents.insert(location.to_string(), document);
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(documents))?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const API: &str = r#"
endpoints:
  - method: GET
    path: /pets/{id}
    parameters:
      - { name: id, in: path, type: integer }
"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn declared_endpoint_exits_zero() {
        let file = write_temp(API);
        let args = SchemaArgs {
            file: file.path().to_path_buf(),
            method: HttpMethod::Get,
            path: "/pets/{id}".into(),
            location: Some(LocationArg::Path),
        };
        assert_eq!(run_schema(&args).unwrap(), 0);
    }

    #[test]
    fn colon_spelling_finds_the_same_endpoint() {
        let file = write_temp(API);
        let args = SchemaArgs {
            file: file.path().to_path_buf(),
            method: HttpMethod::Get,
            path: "/pets/:id".into(),
            location: None,
        };
        assert_eq!(run_schema(&args).unwrap(), 0);
    }

    #[test]
    fn undeclared_endpoint_exits_one() {
        let file = write_temp(API);
        let args = SchemaArgs {
            file: file.path().to_path_buf(),
            method: HttpMethod::Post,
            path: "/pets/{id}".into(),
            location: None,
        };
        assert_eq!(run_schema(&args).unwrap(), 1);
    }

    #[test]
    fn location_arg_maps_to_location() {
        assert_eq!(Location::from(LocationArg::Body), Location::Body);
        assert_eq!(Location::from(LocationArg::Query), Location::Query);
    }
}
