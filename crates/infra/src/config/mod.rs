//! Configuration loading
//!
//! Builds a [`ClientConfig`](jobportal_domain::ClientConfig) from an optional
//! config file and `JOBPORTAL_*` environment variables.

pub mod loader;

// Re-export commonly used items
pub use loader::{apply_env_overrides, load, load_from_env, load_from_file, probe_config_paths};
