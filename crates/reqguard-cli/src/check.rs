//! # Check Subcommand
//!
//! Compiles every endpoint of an API description exactly as the server
//! would at startup, so declaration mistakes surface before deployment.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use reqguard_schema::SchemaCache;

/// Arguments for the `reqguard check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// API description file (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when every endpoint compiles, 1 on a declaration
/// error. An unreadable or unparseable file is an operational error.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let api = crate::load_description(&args.file)?;

    let cache = match SchemaCache::build_all(&api) {
        Ok(cache) => cache,
        Err(e) => {
            println!("FAIL: {e}");
            return Ok(1);
        }
    };

    println!("OK: {} endpoint(s) compiled", cache.len());
    for (method, route, schemas) in cache.iter() {
        println!("  {:<7} {route}{}", method.as_str(), locations(schemas));
    }
    Ok(0)
}

/// ` [path, query, body?]` style suffix listing the validated locations.
fn locations(schemas: &reqguard_schema::EndpointSchemas) -> String {
    let mut parts = Vec::new();
    if schemas.path.is_some() {
        parts.push("path".to_string());
    }
    if schemas.query.is_some() {
        parts.push("query".to_string());
    }
    if let Some(body) = &schemas.body {
        parts.push(if body.required { "body".into() } else { "body?".into() });
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn valid_description_exits_zero() {
        let file = write_temp(
            r#"
endpoints:
  - method: GET
    path: /pets/{id}
    parameters:
      - { name: id, in: path, type: integer }
"#,
        );
        let args = CheckArgs {
            file: file.path().to_path_buf(),
        };
        assert_eq!(run_check(&args).unwrap(), 0);
    }

    #[test]
    fn unbound_path_parameter_exits_one() {
        let file = write_temp(
            r#"
endpoints:
  - method: GET
    path: /pets
    parameters:
      - { name: id, in: path, type: integer }
"#,
        );
        let args = CheckArgs {
            file: file.path().to_path_buf(),
        };
        assert_eq!(run_check(&args).unwrap(), 1);
    }

    #[test]
    fn missing_file_is_operational_error() {
        let args = CheckArgs {
            file: PathBuf::from("/nonexistent/api.yaml"),
        };
        assert!(run_check(&args).is_err());
    }

    #[test]
    fn locations_suffix_marks_optional_body() {
        let api = reqguard_core::ApiDescription::from_yaml_str(
            r#"
endpoints:
  - method: POST
    path: /pets
    body:
      schema: { type: object }
"#,
            "test",
        )
        .unwrap();
        let cache = SchemaCache::build_all(&api).unwrap();
        let (_, _, schemas) = cache.iter().next().unwrap();
        assert_eq!(locations(schemas), " [body?]");
    }
}
