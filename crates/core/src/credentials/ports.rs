//! Persistence port for the session credential

use async_trait::async_trait;
use jobportal_domain::Result;

/// Device-local storage for the bearer token and the cached user profile.
///
/// Implementations must make `clear` idempotent: clearing an empty store
/// succeeds. Writes should be durable once the future resolves.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>>;

    async fn store_token(&self, token: &str) -> Result<()>;

    /// Serialized last-known profile
    async fn load_profile(&self) -> Result<Option<String>>;

    async fn store_profile(&self, profile_json: &str) -> Result<()>;

    /// Remove token and profile together
    async fn clear(&self) -> Result<()>;
}
