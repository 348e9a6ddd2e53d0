use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobportal_core::{CredentialStorage, RetryPolicy};
use jobportal_domain::constants::USER_AGENT;
use jobportal_domain::{PortalError, Result};
use jobportal_infra::{
    ApiClient, CredentialStore, EndpointResolver, ExecutorConfig, MemoryStorage, PortalApi,
};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Per-attempt timeout used by the test clients
pub const TEST_TIMEOUT: Duration = Duration::from_millis(200);
/// Backoff step used by the test clients
pub const TEST_BACKOFF_STEP: Duration = Duration::from_millis(50);

/// Memory storage that counts operations and can be told to fail writes.
#[derive(Default)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    pub clears: AtomicUsize,
    pub stores: AtomicUsize,
    fail_writes: bool,
}

impl RecordingStorage {
    pub fn failing_writes() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStorage for RecordingStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        self.inner.load_token().await
    }

    async fn store_token(&self, token: &str) -> Result<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(PortalError::Storage("storage is read-only".into()));
        }
        self.inner.store_token(token).await
    }

    async fn load_profile(&self) -> Result<Option<String>> {
        self.inner.load_profile().await
    }

    async fn store_profile(&self, profile: &str) -> Result<()> {
        if self.fail_writes {
            return Err(PortalError::Storage("storage is read-only".into()));
        }
        self.inner.store_profile(profile).await
    }

    async fn clear(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear().await
    }
}

/// Client stack pointed at a mock server
pub struct TestPortal {
    pub server: MockServer,
    pub storage: Arc<RecordingStorage>,
    pub credentials: Arc<CredentialStore>,
    pub client: Arc<ApiClient>,
    pub api: PortalApi,
}

impl TestPortal {
    pub async fn start() -> Self {
        Self::with_storage(RecordingStorage::default()).await
    }

    pub async fn with_storage(storage: RecordingStorage) -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(storage);
        let credentials = Arc::new(CredentialStore::new(storage.clone()));
        let client = Arc::new(
            ApiClient::builder()
                .resolver(Arc::new(EndpointResolver::fixed(format!("{}/api", server.uri()))))
                .credentials(credentials.clone())
                .config(test_executor_config())
                .build()
                .expect("client should build"),
        );
        let api = PortalApi::new(client.clone());

        Self { server, storage, credentials, client, api }
    }

    /// Sign in without going through the API
    pub async fn with_token(token: &str) -> Self {
        let portal = Self::start().await;
        portal.credentials.set_token(token).await.expect("token should be stored");
        portal
    }
}

pub fn test_executor_config() -> ExecutorConfig {
    ExecutorConfig {
        timeout: TEST_TIMEOUT,
        retry: RetryPolicy::new(3, TEST_BACKOFF_STEP),
        user_agent: USER_AGENT.to_string(),
    }
}

/// Replays `responses` in order, repeating the last one, and counts calls.
pub struct Sequence {
    responses: Vec<ResponseTemplate>,
    calls: Arc<AtomicUsize>,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> (Self, Arc<AtomicUsize>) {
        assert!(!responses.is_empty(), "sequence needs at least one response");
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { responses, calls: calls.clone() }, calls)
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses[index.min(self.responses.len() - 1)].clone()
    }
}

/// Address nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}
