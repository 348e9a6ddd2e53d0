//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read `.env` from the working directory if present
//! 2. Start from the first config file found by [`probe_config_paths`], or
//!    from defaults
//! 3. Apply environment overrides on top
//!
//! ## Environment Variables
//! - `JOBPORTAL_API_URL`: full base URL (e.g. `https://api.example.com/api`)
//! - `JOBPORTAL_API_HOST`: host only, combined with port `5000` and `/api`
//! - `JOBPORTAL_PLATFORM`: `web`, `android-emulator`, `ios-simulator`, `device`
//! - `JOBPORTAL_TIMEOUT_MS`: per-attempt timeout in milliseconds
//! - `JOBPORTAL_MAX_ATTEMPTS`: attempts per logical call
//! - `JOBPORTAL_BACKOFF_MS`: backoff step in milliseconds
//! - `JOBPORTAL_STORAGE`: `keychain`, `file` or `memory`
//! - `JOBPORTAL_STORAGE_PATH`: directory for the session file
//! - `JOBPORTAL_LOG_LEVEL`: default log filter (`RUST_LOG` still wins)
//! - `JOBPORTAL_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! `jobportal.{json,toml}` then `config.{json,toml}`, looked up in the
//! working directory, its two parents, and next to the executable.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jobportal_domain::{ClientConfig, PortalError, Result, StorageBackend};

use crate::errors::InfraError;

pub const ENV_API_URL: &str = "JOBPORTAL_API_URL";
pub const ENV_API_HOST: &str = "JOBPORTAL_API_HOST";
pub const ENV_PLATFORM: &str = "JOBPORTAL_PLATFORM";
pub const ENV_TIMEOUT_MS: &str = "JOBPORTAL_TIMEOUT_MS";
pub const ENV_MAX_ATTEMPTS: &str = "JOBPORTAL_MAX_ATTEMPTS";
pub const ENV_BACKOFF_MS: &str = "JOBPORTAL_BACKOFF_MS";
pub const ENV_STORAGE: &str = "JOBPORTAL_STORAGE";
pub const ENV_STORAGE_PATH: &str = "JOBPORTAL_STORAGE_PATH";
pub const ENV_LOG_LEVEL: &str = "JOBPORTAL_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "JOBPORTAL_LOG_JSON";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["jobportal.json", "jobportal.toml", "config.json", "config.toml"];

/// Load configuration from `.env`, an optional config file and the
/// environment.
///
/// # Errors
/// Returns `PortalError::Config` if a config file is malformed or an
/// environment override has an invalid value.
pub fn load() -> Result<ClientConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env file"),
    }

    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("no config file found, using defaults");
            ClientConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Defaults with environment overrides applied; no file is read.
///
/// # Errors
/// Returns `PortalError::Config` for invalid numeric or enum values.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// supported, chosen by extension. Missing sections take their defaults.
///
/// # Errors
/// Returns `PortalError::Config` if the file is missing or malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PortalError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PortalError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PortalError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PortalError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PortalError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file, if any.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Apply `JOBPORTAL_*` overrides to `config`.
///
/// # Errors
/// Returns `PortalError::Config` for values that do not parse.
pub fn apply_env_overrides(config: &mut ClientConfig) -> Result<()> {
    if let Some(url) = env_string(ENV_API_URL) {
        config.api.base_url = Some(url);
    }
    if let Some(host) = env_string(ENV_API_HOST) {
        config.api.host = Some(host);
    }
    if let Some(platform) = env_string(ENV_PLATFORM) {
        config.api.platform = Some(platform);
    }
    if let Some(timeout_ms) = env_parse(ENV_TIMEOUT_MS)? {
        config.api.timeout_ms = timeout_ms;
    }
    if let Some(max_attempts) = env_parse::<u32>(ENV_MAX_ATTEMPTS)? {
        if max_attempts == 0 {
            return Err(PortalError::Config(format!("{ENV_MAX_ATTEMPTS} must be at least 1")));
        }
        config.api.max_attempts = max_attempts;
    }
    if let Some(backoff_ms) = env_parse(ENV_BACKOFF_MS)? {
        config.api.backoff_step_ms = backoff_ms;
    }
    if let Some(backend) = env_string(ENV_STORAGE) {
        config.storage.backend =
            backend.parse::<StorageBackend>().map_err(PortalError::Config)?;
    }
    if let Some(path) = env_string(ENV_STORAGE_PATH) {
        config.storage.path = Some(path);
    }
    if let Some(level) = env_string(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);

    Ok(())
}

/// Non-blank value of an environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| PortalError::Config(format!("Invalid {key} '{raw}': {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_string(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
