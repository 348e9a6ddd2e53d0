//! Bearer-token lifecycle
//!
//! [`CredentialStore`] is the single owner of the session token. The token is
//! loaded from durable storage at most once, held in memory for synchronous
//! header construction, and cleared on logout or when the server rejects the
//! session.

use std::sync::Arc;

use jobportal_core::CredentialStorage;
use jobportal_domain::{PortalError, Result, UserProfile};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// In-memory view of the persisted session
pub struct CredentialStore {
    storage: Arc<dyn CredentialStorage>,
    token: RwLock<Option<String>>,
    profile: RwLock<Option<UserProfile>>,
    loaded: OnceCell<()>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .field("loaded", &self.loaded.initialized())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self {
            storage,
            token: RwLock::new(None),
            profile: RwLock::new(None),
            loaded: OnceCell::new(),
        }
    }

    /// Load the persisted token and profile.
    ///
    /// Concurrent and repeated calls share a single load. Storage failures
    /// leave the store logged out.
    pub async fn init(&self) {
        self.loaded.get_or_init(|| self.load()).await;
    }

    async fn load(&self) {
        match self.storage.load_token().await {
            Ok(Some(token)) => {
                debug!("restored persisted session token");
                *self.token.write() = Some(token);
            }
            Ok(None) => debug!("no persisted session token"),
            Err(err) => warn!(error = %err, "failed to load session token, starting logged out"),
        }

        match self.storage.load_profile().await {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => *self.profile.write() = Some(profile),
                Err(err) => warn!(error = %err, "ignoring unreadable cached profile"),
            },
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to load cached profile"),
        }
    }

    /// Hold `token` and persist it.
    ///
    /// The in-memory token is set even when persisting fails; the error only
    /// means the session will not survive a restart.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<()> {
        self.init().await;

        let token = token.into();
        *self.token.write() = Some(token.clone());

        self.storage.store_token(&token).await.map_err(|err| {
            warn!(error = %err, "failed to persist session token");
            PortalError::Storage(format!("session token not persisted: {err}"))
        })?;

        info!("session token stored");
        Ok(())
    }

    /// Forget the token and cached profile, in memory and in storage.
    ///
    /// Safe to call when nothing is stored and from several tasks at once.
    pub async fn clear_token(&self) {
        self.init().await;

        let had_token = self.token.write().take().is_some();
        self.profile.write().take();

        if let Err(err) = self.storage.clear().await {
            warn!(error = %err, "failed to clear persisted session");
        }

        if had_token {
            info!("session cleared");
        }
    }

    /// Headers for a JSON request: `Content-Type` plus `Authorization` when a
    /// token is held.
    pub fn get_headers(&self) -> HeaderMap {
        let mut headers = self.auth_headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// `Authorization` only, for multipart bodies whose content type carries
    /// the boundary.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(token) = self.token.read().as_deref() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("session token is not a valid header value, sending without it"),
            }
        }

        headers
    }

    /// Cache the signed-in user's profile next to the token.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(profile)
            .map_err(|err| PortalError::Serialization(err.to_string()))?;
        *self.profile.write() = Some(profile.clone());
        self.storage.store_profile(&raw).await
    }

    pub fn cached_profile(&self) -> Option<UserProfile> {
        self.profile.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
