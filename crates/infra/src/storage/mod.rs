//! Durable storage adapters for the bearer token and cached profile
//!
//! Each adapter implements [`CredentialStorage`]. [`build_storage`] picks one
//! from [`StorageConfig`].

#[cfg(feature = "keychain")]
pub mod keychain;

pub mod file;
pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use jobportal_core::CredentialStorage;
use jobportal_domain::{PortalError, Result, StorageBackend, StorageConfig};
use tracing::warn;

pub use file::FileStorage;
#[cfg(feature = "keychain")]
pub use keychain::KeychainStorage;
pub use memory::MemoryStorage;

/// Storage adapter for the configured backend.
///
/// A keychain backend falls back to the session file when the build lacks the
/// `keychain` feature or the platform keychain cannot hold a secret.
pub fn build_storage(config: &StorageConfig) -> Result<Arc<dyn CredentialStorage>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::File => Ok(Arc::new(FileStorage::new(session_dir(config)?))),
        #[cfg(feature = "keychain")]
        StorageBackend::Keychain => {
            let keychain = KeychainStorage::new(&config.service_name);
            if keychain.is_persistent() {
                return Ok(Arc::new(keychain));
            }
            warn!(service = %config.service_name, "platform keychain unusable, using session file");
            Ok(Arc::new(FileStorage::new(session_dir(config)?)))
        }
        #[cfg(not(feature = "keychain"))]
        StorageBackend::Keychain => {
            warn!("keychain support not compiled in, using session file");
            Ok(Arc::new(FileStorage::new(session_dir(config)?)))
        }
    }
}

/// Directory holding the session file: the configured path, else a
/// per-service directory under the user's data dir.
fn session_dir(config: &StorageConfig) -> Result<PathBuf> {
    if let Some(path) = config.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let base = data_home().ok_or_else(|| {
        PortalError::Config("no storage path configured and no home directory found".into())
    })?;
    Ok(base.join(&config.service_name))
}

fn data_home() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(dir) = std::env::var_os("APPDATA").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => Some(PathBuf::from(home).join(".local").join("share")),
        None => {
            warn!("HOME is not set");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_builds() {
        let config = StorageConfig { backend: StorageBackend::Memory, ..StorageConfig::default() };
        let storage = build_storage(&config).unwrap();
        assert_eq!(storage.load_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_backend_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().display().to_string()),
            ..StorageConfig::default()
        };

        let storage = build_storage(&config).unwrap();
        storage.store_token("abc").await.unwrap();
        assert!(dir.path().join(jobportal_domain::constants::SESSION_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn default_backend_keeps_token_across_adapters() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            service_name: "JobPortal.admin.default-backend-test".into(),
            path: Some(dir.path().display().to_string()),
            ..StorageConfig::default()
        };
        assert_eq!(config.backend, StorageBackend::Keychain);

        let storage = build_storage(&config).unwrap();
        storage.store_token("abc").await.unwrap();
        assert_eq!(storage.load_token().await.unwrap().as_deref(), Some("abc"));

        let fresh = build_storage(&config).unwrap();
        assert_eq!(fresh.load_token().await.unwrap().as_deref(), Some("abc"));

        fresh.clear().await.unwrap();
        assert_eq!(storage.load_token().await.unwrap(), None);
    }
}
