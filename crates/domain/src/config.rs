//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_STEP_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_SERVICE_NAME, DEFAULT_TIMEOUT_MS,
    USER_AGENT,
};
use crate::impl_wire_enum_conversions;

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Backend endpoint and request policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full base URL override (e.g. `https://api.example.com/api`)
    pub base_url: Option<String>,
    /// Host-only override, combined with the fixed port and path prefix
    pub host: Option<String>,
    /// Runtime platform (`web`, `android-emulator`, `ios-simulator`, `device`)
    pub platform: Option<String>,
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_step_ms: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: None,
            platform: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_step_ms: DEFAULT_BACKOFF_STEP_MS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Where the bearer token and cached profile are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Platform keychain (macOS Keychain, Windows Credential Manager, Secret
    /// Service)
    #[default]
    Keychain,
    /// JSON session file in an application data directory
    File,
    /// Process-local only; nothing survives a restart
    Memory,
}

impl_wire_enum_conversions!(StorageBackend {
    Keychain => "keychain" | "keyring",
    File => "file",
    Memory => "memory" | "ephemeral",
});

/// Credential storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the `file` backend
    pub path: Option<String>,
    /// Keychain service name for the `keychain` backend
    pub service_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
