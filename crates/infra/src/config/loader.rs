//! Configuration loader
//!
//! Environment first, file second. A `.env` file in the working directory is
//! read into the environment before anything else.
//!
//! ## Environment Variables
//! - `ORBU_DB_PATH` (required for environment loading)
//! - `ORBU_DB_POOL_SIZE`
//! - `ORBU_POOL_IDLE_TIMEOUT_SECS`
//! - `ORBU_RETENTION_ENABLED`, `ORBU_RETENTION_CRON`, `ORBU_RETENTION_JOB_TIMEOUT_SECS`
//! - `ORBU_LOG_LEVEL`, `ORBU_LOG_JSON`
//!
//! Unset optional variables keep the [`GatewayConfig`] defaults.
//!
//! ## File Locations
//! `orbu.toml`, `orbu.json`, `config.toml` and `config.json`, looked up in
//! the working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use orbu_domain::{DatabaseConfig, GatewayConfig, GatewayError, Result};
use tracing::{debug, info};

const CONFIG_FILE_NAMES: [&str; 4] = ["orbu.toml", "orbu.json", "config.toml", "config.json"];

/// Load configuration from the environment, falling back to a config file.
pub fn load() -> Result<GatewayConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(err) => {
            debug!(error = %err, "Environment configuration incomplete, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `ORBU_*` environment variables.
///
/// # Errors
/// `Config` when `ORBU_DB_PATH` is missing or a numeric variable does not
/// parse.
pub fn load_from_env() -> Result<GatewayConfig> {
    let mut config = GatewayConfig {
        database: DatabaseConfig { path: env_var("ORBU_DB_PATH")?, ..DatabaseConfig::default() },
        ..GatewayConfig::default()
    };

    if let Some(pool_size) = env_parse("ORBU_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(idle) = env_parse("ORBU_POOL_IDLE_TIMEOUT_SECS")? {
        config.pool.idle_timeout_secs = idle;
    }

    config.retention.enabled = env_bool("ORBU_RETENTION_ENABLED", config.retention.enabled);
    if let Ok(cron) = std::env::var("ORBU_RETENTION_CRON") {
        config.retention.cron_expression = cron;
    }
    if let Some(timeout) = env_parse("ORBU_RETENTION_JOB_TIMEOUT_SECS")? {
        config.retention.job_timeout_secs = timeout;
    }

    if let Ok(level) = std::env::var("ORBU_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("ORBU_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file, probing the standard locations when
/// `path` is `None`. The format follows the extension (`.toml` or `.json`).
pub fn load_from_file(path: Option<PathBuf>) -> Result<GatewayConfig> {
    let config_path = match path {
        Some(path) if path.exists() => path,
        Some(path) => {
            return Err(GatewayError::Config(format!("Config file not found: {}", path.display())))
        }
        None => probe_config_paths().ok_or_else(|| {
            GatewayError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GatewayError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<GatewayConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid JSON format: {e}"))),
        other => Err(GatewayError::Config(format!("Unsupported config format: {other}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.join(".."));
        roots.insert(0, cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|candidate| candidate.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| GatewayError::Config(format!("Missing required environment variable: {key}")))
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GatewayError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` in any case.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
