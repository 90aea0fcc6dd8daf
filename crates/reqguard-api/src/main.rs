//! # reqguard-api — Binary Entry Point
//!
//! Loads the API description named by `API_DESCRIPTION`, compiles it, and
//! serves every declared endpoint behind the validator.

use anyhow::Context;

use reqguard_api::config::{ApiConfig, ConfigError};
use reqguard_core::ApiDescription;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = ApiConfig::from_env()?;
    let path = config
        .api_description
        .clone()
        .ok_or(ConfigError::MissingDescription)?;
    let api = ApiDescription::load(&path)
        .with_context(|| format!("loading API description {}", path.display()))?;

    let app = reqguard_api::app(&api, &config).map_err(|e| {
        tracing::error!("schema compilation failed: {e}");
        e
    })?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        endpoints = api.endpoints.len(),
        malformed_body = %config.malformed_body,
        "reqguard listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
