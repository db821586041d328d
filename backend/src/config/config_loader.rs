use anyhow::{Context, Result};
use std::str::FromStr;

use super::{
    config_model::{BackendServer, Cors, Database, DotEnvyConfig},
    stage::Stage,
};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from an arbitrary variable source.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<DotEnvyConfig> {
    let stage_raw = lookup("STAGE").unwrap_or_default();
    let stage = Stage::try_from(stage_raw.as_str())?;

    let backend_server = BackendServer {
        port: required(&lookup, "SERVER_PORT")?,
        body_limit: required(&lookup, "SERVER_BODY_LIMIT")?,
        timeout: required(&lookup, "SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .context("DATABASE_URL is invalid")?,
        max_connections: optional(&lookup, "DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        disable_prepared_statements: optional(&lookup, "DATABASE_DISABLE_PREPARED_STATEMENTS")?
            .unwrap_or(false),
    };

    let cors = Cors {
        allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };

    Ok(DotEnvyConfig {
        stage,
        backend_server,
        database,
        cors,
    })
}

fn required<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(lookup, key)?.with_context(|| format!("{key} is invalid"))
}

fn optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} is invalid")),
        None => Ok(None),
    }
}
