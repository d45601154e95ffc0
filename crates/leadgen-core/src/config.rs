use crate::app_config::{AppConfig, Environment};
use crate::catalog::{load_catalog, LocationCatalog};
use crate::reconcile::MAX_CHECK_CHUNK;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Resolve the location catalog named by the config.
///
/// Uses the built-in catalog unless `catalog_path` is set. A configured
/// top-tier size replaces the catalog's own; otherwise the file's value (or
/// the built-in 20) stands.
///
/// # Errors
///
/// Returns `ConfigError` if the catalog file cannot be loaded.
pub fn resolve_catalog(config: &AppConfig) -> Result<LocationCatalog, ConfigError> {
    let catalog = match &config.catalog_path {
        Some(path) => load_catalog(path)?,
        None => LocationCatalog::builtin().clone(),
    };
    Ok(match config.top_tier_cities {
        Some(top_tier) => catalog.with_top_tier(top_tier),
        None => catalog,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize_in = |var: &str,
                          default: &str,
                          range: std::ops::RangeInclusive<usize>|
     -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if !range.contains(&value) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!(
                    "{value} is outside {}..={}",
                    range.start(),
                    range.end()
                ),
            });
        }
        Ok(value)
    };

    let database_url = lookup("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());

    let env = parse_environment(&or_default("LEADGEN_ENV", "development"))?;
    let log_level = or_default("LEADGEN_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("LEADGEN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LEADGEN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LEADGEN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let catalog_path = lookup("LEADGEN_CATALOG_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let top_tier_cities = match lookup("LEADGEN_TOP_TIER_CITIES") {
        Ok(_) => Some(parse_usize_in("LEADGEN_TOP_TIER_CITIES", "20", 0..=usize::MAX)?),
        Err(_) => None,
    };
    let check_chunk_size = parse_usize_in("LEADGEN_CHECK_CHUNK_SIZE", "100", 1..=MAX_CHECK_CHUNK)?;
    let check_concurrency = parse_usize_in("LEADGEN_CHECK_CONCURRENCY", "4", 1..=64)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        catalog_path,
        top_tier_cities,
        check_chunk_size,
        check_concurrency,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADGEN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
