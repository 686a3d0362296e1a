//! Configuration loader
//!
//! Loads [`Config`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Read a `.env` file into the environment if one exists
//! 2. If `EDGEBULK_API_TOKEN` is set, build the config from the environment
//! 3. Otherwise fall back to the first config file found on disk
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `EDGEBULK_API_TOKEN`: API bearer token (required)
//! - `EDGEBULK_API_BASE_URL`: API base URL
//! - `EDGEBULK_ACCOUNT_ID`: account id for account-scoped endpoints
//! - `EDGEBULK_BATCH_SIZE`: items per request
//! - `EDGEBULK_CONCURRENCY`: requests in flight per operation
//! - `EDGEBULK_ZONE_CONCURRENCY`: zones processed in parallel
//! - `EDGEBULK_PAGINATION_MAX_RETRIES`: retries per page fetch
//! - `EDGEBULK_PAGINATION_TIMEOUT_SECS`: wall-clock budget per listing
//! - `EDGEBULK_PAGINATION_PAGE_LIMIT`: maximum pages per listing
//! - `EDGEBULK_LOG_FILTER`: default tracing filter
//! - `EDGEBULK_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! `edgebulk.toml`, `edgebulk.json`, `config.toml` and `config.json` are
//! probed in the working directory, its parent and grandparent, then the
//! same places relative to the executable. Format follows the extension.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use edgebulk_domain::{Config, EdgeBulkError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["edgebulk.toml", "edgebulk.json", "config.toml", "config.json"];
const SEARCH_DIRS: [&str; 3] = [".", "..", "../.."];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `EdgeBulkError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from `EDGEBULK_*` environment variables.
///
/// Only the token is required; every other field keeps its default when
/// its variable is unset.
///
/// # Errors
/// Returns `EdgeBulkError::Config` if the token is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.api.api_token = env_var("EDGEBULK_API_TOKEN")?;

    if let Some(base_url) = optional_env("EDGEBULK_API_BASE_URL") {
        config.api.base_url = base_url;
    }
    config.api.account_id = optional_env("EDGEBULK_ACCOUNT_ID");

    if let Some(batch_size) = env_parse::<usize>("EDGEBULK_BATCH_SIZE")? {
        config.batch.batch_size = batch_size;
        config.fan_out.batch.batch_size = batch_size;
    }
    if let Some(concurrency) = env_parse::<usize>("EDGEBULK_CONCURRENCY")? {
        config.batch.concurrency = concurrency;
        config.fan_out.batch.concurrency = concurrency;
    }
    if let Some(zone_concurrency) = env_parse::<usize>("EDGEBULK_ZONE_CONCURRENCY")? {
        config.fan_out.zone_concurrency = zone_concurrency;
    }

    if let Some(max_retries) = env_parse::<u32>("EDGEBULK_PAGINATION_MAX_RETRIES")? {
        config.pagination.max_retries = max_retries;
    }
    config.pagination.timeout =
        env_parse::<u64>("EDGEBULK_PAGINATION_TIMEOUT_SECS")?.map(Duration::from_secs);
    config.pagination.page_limit = env_parse::<usize>("EDGEBULK_PAGINATION_PAGE_LIMIT")?;

    if let Some(filter) = optional_env("EDGEBULK_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("EDGEBULK_LOG_JSON", false);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations
/// ([`probe_config_paths`]).
///
/// # Errors
/// Returns `EdgeBulkError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(EdgeBulkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            EdgeBulkError::Config(
                "No config file found and EDGEBULK_API_TOKEN is not set".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| EdgeBulkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format follows the extension
/// of `path` (`.json` when it has none).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| EdgeBulkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| EdgeBulkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(EdgeBulkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    let exe_dir = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf));
    roots.extend(exe_dir);

    candidate_paths(&roots).into_iter().find(|path| path.exists())
}

fn candidate_paths(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| SEARCH_DIRS.iter().map(move |dir| root.join(dir)))
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

/// Required environment variable; blank counts as missing.
fn env_var(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| {
        EdgeBulkError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| EdgeBulkError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
