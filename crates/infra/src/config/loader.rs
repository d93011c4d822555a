//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `NEXUS_BASE_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `NEXUS_BASE_URL`: Server base URL (required)
//! - `NEXUS_TIMEOUT_SECONDS`: Per-request timeout in seconds
//! - `NEXUS_TOKEN_CACHE_DIR`: Directory of the refresh token cache
//! - `NEXUS_CONFIGURATION_HEADER_KEY`: Name of the configuration header
//! - `NEXUS_JOB_POLL_INTERVAL_MS`: Export job poll interval in milliseconds
//! - `NEXUS_USER_AGENT`: `User-Agent` sent with every request
//!
//! ## File Locations
//! The loader probes `nexus.{json,toml}` and `config.{json,toml}` in the
//! current working directory, then next to the executable.

use std::path::{Path, PathBuf};

use nexus_domain::{ApiError, ClientConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["nexus.json", "nexus.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ApiError::Config` if neither source yields a valid configuration.
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `NEXUS_BASE_URL` is required; everything else falls back to the
/// [`ClientConfig::new`] defaults.
///
/// # Errors
/// Returns `ApiError::Config` if `NEXUS_BASE_URL` is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var("NEXUS_BASE_URL")?);

    if let Some(timeout) = env_number("NEXUS_TIMEOUT_SECONDS")? {
        config.timeout_seconds = timeout;
    }
    if let Some(interval) = env_number("NEXUS_JOB_POLL_INTERVAL_MS")? {
        config.job_poll_interval_ms = interval;
    }
    if let Ok(dir) = std::env::var("NEXUS_TOKEN_CACHE_DIR") {
        config.token_cache_dir = Some(PathBuf::from(dir));
    }
    if let Ok(key) = std::env::var("NEXUS_CONFIGURATION_HEADER_KEY") {
        config.configuration_header_key = key;
    }
    config.user_agent = std::env::var("NEXUS_USER_AGENT").ok();

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. The format is
/// detected by file extension.
///
/// # Errors
/// Returns `ApiError::Config` if the file is missing, unreadable or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ApiError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ApiError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ApiError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ApiError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ApiError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ApiError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the working directory or next to the
/// executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ApiError::Config(format!("Missing required environment variable: {key}")))
}

fn env_number(key: &str) -> Result<Option<u64>> {
    std::env::var(key)
        .ok()
        .map(|s| {
            s.trim().parse::<u64>().map_err(|e| ApiError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}
