//! Platform keychain credential storage
//!
//! Token and profile are two entries under one keychain service. Keychain
//! calls block, so each runs on the blocking pool.

use async_trait::async_trait;
use jobportal_core::CredentialStorage;
use jobportal_domain::constants::{PROFILE_KEY, TOKEN_KEY};
use jobportal_domain::{PortalError, Result};
use keyring::Entry;
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Scratch entry written while checking that the store keeps secrets.
const CHECK_KEY: &str = "auth.check";

/// Stores credentials in the macOS Keychain, Windows Credential Manager or
/// the Secret Service.
#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service: String,
}

impl KeychainStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Whether a secret written through one keychain handle can be read back
    /// through another.
    ///
    /// Fails when keyring has no platform store compiled in and hands out its
    /// in-process mock, or when the store is locked or unreachable. Blocks
    /// on the keychain.
    pub fn is_persistent(&self) -> bool {
        match check_round_trip(&self.service) {
            Ok(true) => true,
            Ok(false) => {
                warn!(service = %self.service, "keychain did not return the secret it was given");
                false
            }
            Err(err) => {
                warn!(service = %self.service, error = %err, "keychain unavailable");
                false
            }
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || op(&service))
            .await
            .map_err(|err| PortalError::Internal(format!("keychain task failed: {err}")))?
    }
}

fn entry(service: &str, key: &str) -> Result<Entry> {
    Entry::new(service, key).map_err(|err| InfraError::from(err).into())
}

fn read_secret(service: &str, key: &str) -> Result<Option<String>> {
    match entry(service, key)?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(InfraError::from(err).into()),
    }
}

fn write_secret(service: &str, key: &str, value: &str) -> Result<()> {
    debug!(service, key, "storing secret in keychain");
    entry(service, key)?.set_password(value).map_err(|err| InfraError::from(err).into())
}

fn delete_secret(service: &str, key: &str) -> Result<()> {
    match entry(service, key)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(InfraError::from(err).into()),
    }
}

fn check_round_trip(service: &str) -> Result<bool> {
    let sentinel = format!("check-{}", std::process::id());
    write_secret(service, CHECK_KEY, &sentinel)?;
    let read_back = read_secret(service, CHECK_KEY);
    if let Err(err) = delete_secret(service, CHECK_KEY) {
        debug!(service, error = %err, "failed to remove keychain check entry");
    }
    Ok(read_back?.as_deref() == Some(sentinel.as_str()))
}

#[async_trait]
impl CredentialStorage for KeychainStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        self.blocking(|service| read_secret(service, TOKEN_KEY)).await
    }

    async fn store_token(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.blocking(move |service| write_secret(service, TOKEN_KEY, &token)).await
    }

    async fn load_profile(&self) -> Result<Option<String>> {
        self.blocking(|service| read_secret(service, PROFILE_KEY)).await
    }

    async fn store_profile(&self, profile: &str) -> Result<()> {
        let profile = profile.to_string();
        self.blocking(move |service| write_secret(service, PROFILE_KEY, &profile)).await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|service| {
            // Attempt both so a failure on one entry does not strand the other.
            let token = delete_secret(service, TOKEN_KEY);
            let profile = delete_secret(service, PROFILE_KEY);
            token.and(profile)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_service_name() {
        let storage = KeychainStorage::new("JobPortal.admin.test");
        assert_eq!(storage.service(), "JobPortal.admin.test");
    }

    #[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
    #[test]
    fn entries_use_a_platform_store() {
        let entry = Entry::new("JobPortal.admin.test", TOKEN_KEY).unwrap();
        assert!(
            entry.get_credential().downcast_ref::<keyring::mock::MockCredential>().is_none(),
            "keyring resolved to its in-memory mock store"
        );
    }

    #[tokio::test]
    async fn persistent_keychain_keeps_token_for_a_fresh_adapter() {
        let storage = KeychainStorage::new("JobPortal.admin.persistence-test");
        if !storage.is_persistent() {
            return;
        }

        storage.store_token("abc").await.unwrap();
        let fresh = KeychainStorage::new("JobPortal.admin.persistence-test");
        assert_eq!(fresh.load_token().await.unwrap().as_deref(), Some("abc"));

        fresh.clear().await.unwrap();
        assert_eq!(storage.load_token().await.unwrap(), None);
    }

    // Requires an unlocked platform keychain.
    #[tokio::test]
    #[ignore = "touches the real platform keychain"]
    async fn round_trip_against_platform_keychain() {
        let storage = KeychainStorage::new("JobPortal.admin.integration-test");

        storage.store_token("abc").await.unwrap();
        assert_eq!(storage.load_token().await.unwrap().as_deref(), Some("abc"));

        storage.clear().await.unwrap();
        assert_eq!(storage.load_token().await.unwrap(), None);
    }
}
