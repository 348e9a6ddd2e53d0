//! Portal context - dependency wiring

use std::sync::Arc;

use jobportal_core::CredentialStorage;
use jobportal_domain::{ClientConfig, Result};
use tracing::info;

use crate::api::{ApiClient, CredentialStore, EndpointResolver, ExecutorConfig, PortalApi};
use crate::storage::build_storage;

/// Type alias for credential storage port trait object
type DynCredentialStorage = dyn CredentialStorage;

/// Holds the client stack built from one [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct PortalContext {
    pub config: ClientConfig,
    pub resolver: Arc<EndpointResolver>,
    pub credentials: Arc<CredentialStore>,
    pub client: Arc<ApiClient>,
    pub api: PortalApi,
}

impl PortalContext {
    /// Build storage, resolver, credential store, client and facade, then
    /// load any persisted session.
    ///
    /// # Errors
    /// Returns error if the storage adapter or HTTP transport cannot be built
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let storage = build_storage(&config.storage)?;
        Self::with_storage(config, storage).await
    }

    /// Like [`new`](Self::new) over an explicit storage adapter.
    ///
    /// # Errors
    /// Returns error if the HTTP transport cannot be built
    pub async fn with_storage(
        config: ClientConfig,
        storage: Arc<DynCredentialStorage>,
    ) -> Result<Self> {
        let resolver = Arc::new(EndpointResolver::from_config(&config.api));
        let credentials = Arc::new(CredentialStore::new(storage));
        let client = Arc::new(ApiClient::new(
            Arc::clone(&resolver),
            Arc::clone(&credentials),
            ExecutorConfig::from_config(&config.api),
        )?);
        let api = PortalApi::new(Arc::clone(&client));

        credentials.init().await;
        info!(
            base_url = %resolver.resolve_base_url(),
            authenticated = credentials.is_authenticated(),
            "portal context ready"
        );

        Ok(Self { config, resolver, credentials, client, api })
    }
}

#[cfg(test)]
mod tests {
    use jobportal_domain::StorageBackend;

    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn wires_configured_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = Some("https://api.portal.example/api".into());
        config.storage.backend = StorageBackend::Memory;

        let ctx = PortalContext::new(config).await.unwrap();
        assert_eq!(ctx.resolver.resolve_base_url(), "https://api.portal.example/api");
        assert!(!ctx.credentials.is_authenticated());
        assert!(Arc::ptr_eq(ctx.api.credentials(), &ctx.credentials));
    }

    #[tokio::test]
    async fn restores_persisted_session() {
        let storage = Arc::new(MemoryStorage::with_token("persisted"));
        let ctx = PortalContext::with_storage(ClientConfig::default(), storage).await.unwrap();

        assert!(ctx.credentials.is_authenticated());
        assert!(ctx.client.credentials().is_authenticated());
    }
}
