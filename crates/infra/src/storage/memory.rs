//! Process-local credential storage

use async_trait::async_trait;
use jobportal_core::CredentialStorage;
use jobportal_domain::Result;
use parking_lot::Mutex;

/// Keeps the token and profile in memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    token: Option<String>,
    profile: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a token, as if persisted by an earlier run
    pub fn with_token(token: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.state.lock().token = Some(token.into());
        storage
    }
}

#[async_trait]
impl CredentialStorage for MemoryStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self.state.lock().token.clone())
    }

    async fn store_token(&self, token: &str) -> Result<()> {
        self.state.lock().token = Some(token.to_string());
        Ok(())
    }

    async fn load_profile(&self) -> Result<Option<String>> {
        Ok(self.state.lock().profile.clone())
    }

    async fn store_profile(&self, profile: &str) -> Result<()> {
        self.state.lock().profile = Some(profile.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.token = None;
        state.profile = None;
        Ok(())
    }
}
