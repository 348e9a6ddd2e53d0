//! Application constants
//!
//! Centralized location for the request-policy and endpoint defaults used by
//! the API client.

// Request policy
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 1_000;
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 5_000;
pub const REQUEST_ID_LENGTH: usize = 8;

// Endpoint defaults
pub const API_PORT: u16 = 5000;
pub const API_PATH_PREFIX: &str = "/api";
pub const WEB_HOST: &str = "localhost";
pub const ANDROID_EMULATOR_HOST: &str = "10.0.2.2";
pub const IOS_SIMULATOR_HOST: &str = "localhost";
pub const DEVICE_HOST: &str = "192.168.1.100";
pub const FALLBACK_BASE_URL: &str = "http://localhost:5000/api";

// Credential storage
pub const DEFAULT_SERVICE_NAME: &str = "JobPortal.admin";
pub const TOKEN_KEY: &str = "auth.token";
pub const PROFILE_KEY: &str = "auth.profile";
pub const SESSION_FILE_NAME: &str = "session.json";

pub const USER_AGENT: &str = concat!("JobPortal-Admin/", env!("CARGO_PKG_VERSION"));
