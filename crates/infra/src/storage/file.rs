//! Session-file credential storage
//!
//! Token and profile live in one JSON file. Every write goes to a temporary
//! file in the same directory which is then renamed over the old one, so a
//! crash leaves either the previous or the new session, never a torn file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use jobportal_core::CredentialStorage;
use jobportal_domain::constants::SESSION_FILE_NAME;
use jobportal_domain::{PortalError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::InfraError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
}

/// Persists credentials to `<dir>/session.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    inner: Arc<FileInner>,
}

#[derive(Debug)]
struct FileInner {
    dir: PathBuf,
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(SESSION_FILE_NAME);
        Self { inner: Arc::new(FileInner { dir, path, lock: Mutex::new(()) }) }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&FileInner) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = inner.lock.lock();
            op(&inner)
        })
        .await
        .map_err(|err| PortalError::Internal(format!("session file task failed: {err}")))?
    }
}

impl FileInner {
    fn read(&self) -> Result<SessionRecord> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(SessionRecord::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| InfraError::from(err).into()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(SessionRecord::default()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    fn write(&self, record: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(InfraError::from)?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(InfraError::from)?;
        serde_json::to_writer(&mut tmp, record).map_err(InfraError::from)?;
        tmp.flush().map_err(InfraError::from)?;
        tmp.as_file().sync_all().map_err(InfraError::from)?;
        tmp.persist(&self.path).map_err(InfraError::from)?;

        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut SessionRecord)) -> Result<()> {
        // A corrupt file is replaced rather than blocking new writes.
        let mut record = self.read().unwrap_or_default();
        apply(&mut record);
        self.write(&record)
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}

#[async_trait]
impl CredentialStorage for FileStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        self.blocking(|inner| Ok(inner.read()?.token)).await
    }

    async fn store_token(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.blocking(move |inner| inner.update(|record| record.token = Some(token))).await
    }

    async fn load_profile(&self) -> Result<Option<String>> {
        self.blocking(|inner| Ok(inner.read()?.profile)).await
    }

    async fn store_profile(&self, profile: &str) -> Result<()> {
        let profile = profile.to_string();
        self.blocking(move |inner| inner.update(|record| record.profile = Some(profile))).await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(FileInner::remove).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.load_token().await.unwrap(), None);
        assert_eq!(storage.load_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn token_and_profile_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.store_token("abc").await.unwrap();
        storage.store_profile(r#"{"id":"u1"}"#).await.unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.load_token().await.unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.load_profile().await.unwrap().as_deref(), Some(r#"{"id":"u1"}"#));

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temporary files must not be left behind");
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.store_token("abc").await.unwrap();

        storage.clear().await.unwrap();
        storage.clear().await.unwrap();

        assert!(!storage.path().exists());
        assert_eq!(storage.load_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_then_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::write(storage.path(), b"{not json").unwrap();

        let err = storage.load_token().await.unwrap_err();
        assert!(matches!(err, PortalError::Serialization(_)));

        storage.store_token("fresh").await.unwrap();
        assert_eq!(storage.load_token().await.unwrap().as_deref(), Some("fresh"));
    }
}
