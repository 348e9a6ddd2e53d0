//! Request executor
//!
//! [`ApiClient`] turns one logical call into up to `max_attempts` network
//! attempts. Each attempt is bounded by a timeout and classified into an
//! [`AttemptOutcome`]; the call then moves through
//!
//! ```text
//! Attempting ──Success──────────────▶ Succeeded
//!     │  ▲
//!     │  └───── BackoffWait ◀──Retryable
//!     └──────────Fatal──────────────▶ Failed
//! ```
//!
//! Every call ends in exactly one value or one [`ApiError`]. An `AuthExpired`
//! outcome clears the credential store before the error is returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jobportal_core::{
    classify_response, classify_transport, new_request_id, ApiError, ApiErrorKind,
    AttemptOutcome, Failure, RetryPolicy,
};
use jobportal_domain::constants::{HEALTH_CHECK_TIMEOUT_MS, USER_AGENT};
use jobportal_domain::{ApiConfig, PortalError};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use super::credentials::CredentialStore;
use super::endpoint::{EndpointResolver, EndpointSettings};
use super::request::{build_form, RequestBody, RequestOptions};
use crate::http::client::is_network_failure;
use crate::http::HttpTransport;
use crate::observability::error_label;

/// Timeout and retry policy for the executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Deadline for one attempt, covering send and body read
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

impl ExecutorConfig {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            retry: RetryPolicy::from_config(config),
            user_agent: if config.user_agent.trim().is_empty() {
                USER_AGENT.to_string()
            } else {
                config.user_agent.clone()
            },
        }
    }
}

/// State of one logical call
enum CallState {
    Attempting { attempt: u32 },
    BackoffWait { attempt: u32, delay: Duration },
    Succeeded { value: Value, attempts: u32 },
    Failed(ApiError),
}

/// Successful call with its correlation data
struct Completed {
    value: Value,
    request_id: String,
    attempts: u32,
}

/// Resilient client for the portal REST API
#[derive(Debug)]
pub struct ApiClient {
    transport: HttpTransport,
    resolver: Arc<EndpointResolver>,
    credentials: Arc<CredentialStore>,
    config: ExecutorConfig,
}

impl ApiClient {
    /// Create a client over an explicit resolver and credential store.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP transport cannot be built
    pub fn new(
        resolver: Arc<EndpointResolver>,
        credentials: Arc<CredentialStore>,
        config: ExecutorConfig,
    ) -> Result<Self, PortalError> {
        let transport = HttpTransport::builder().user_agent(config.user_agent.clone()).build()?;
        Ok(Self::with_transport(transport, resolver, credentials, config))
    }

    /// Create a client over an already-built transport.
    pub fn with_transport(
        transport: HttpTransport,
        resolver: Arc<EndpointResolver>,
        credentials: Arc<CredentialStore>,
        config: ExecutorConfig,
    ) -> Self {
        Self { transport, resolver, credentials, config }
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn resolver(&self) -> &Arc<EndpointResolver> {
        &self.resolver
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run one logical call and return the parsed JSON body
    /// (`Value::Null` for an empty 2xx body).
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt
    pub async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.call(endpoint, options).await.map(|completed| completed.value)
    }

    /// Like [`execute`](Self::execute), deserialising the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt, or a `Parse` error
    /// when the body does not have the shape of `T`
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.execute_with(endpoint, options, std::convert::identity).await
    }

    /// Like [`execute_as`](Self::execute_as), reshaping the body with
    /// `prepare` before it is deserialised.
    ///
    /// # Errors
    ///
    /// Same as [`execute_as`](Self::execute_as)
    pub async fn execute_with<T, F>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        prepare: F,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(Value) -> Value,
    {
        let Completed { value, request_id, attempts } = self.call(endpoint, options).await?;
        decode(prepare(value), endpoint, &request_id, attempts)
    }

    /// `GET` the endpoint with the default timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Same as [`execute_as`](Self::execute_as)
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.execute_as(endpoint, RequestOptions::get()).await
    }

    /// `POST` `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidRequest` error without sending anything when `body`
    /// cannot be serialised, otherwise the same as [`execute_as`](Self::execute_as)
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(endpoint, body)?;
        self.execute_as(endpoint, RequestOptions::post(body)).await
    }

    /// `PUT` `body` as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post)
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(endpoint, body)?;
        self.execute_as(endpoint, RequestOptions::put(body)).await
    }

    /// `PATCH` `body` as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post)
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(endpoint, body)?;
        self.execute_as(endpoint, RequestOptions::patch(body)).await
    }

    /// # Errors
    ///
    /// Same as [`execute_as`](Self::execute_as)
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.execute_as(endpoint, RequestOptions::delete()).await
    }

    /// Single unauthenticated `GET /health` with a short timeout.
    ///
    /// `Ok(false)` when the server answers with a non-2xx status.
    ///
    /// # Errors
    ///
    /// Returns a `Network` or `Timeout` error when no answer arrives
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let endpoint = "/health";
        let request_id = new_request_id();
        let url = self.resolver.url_for(endpoint);
        let timeout = Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS);

        let request = self.transport.request(Method::GET, &url).build().map_err(|err| {
            ApiError::from_failure(invalid_request(err), endpoint, &request_id, 0)
        })?;

        let failure = match tokio::time::timeout(timeout, self.transport.fetch(request)).await {
            Ok(Ok(response)) if response.status.is_success() => {
                info!("API is healthy");
                return Ok(true);
            }
            Ok(Ok(response)) => {
                warn!(status = %response.status, "API returned non-success status");
                return Ok(false);
            }
            Ok(Err(err)) => transport_failure(err),
            Err(_) => timeout_failure(timeout),
        };

        warn!(kind = %failure.kind, error = %failure.message, "health check failed");
        Err(ApiError::from_failure(failure, endpoint, request_id, 1))
    }

    async fn call(&self, endpoint: &str, options: RequestOptions) -> Result<Completed, ApiError> {
        let request_id = new_request_id();
        let span = info_span!(
            "api_call",
            endpoint = %endpoint,
            method = %options.method,
            request_id = %request_id,
        );

        let (value, attempts) =
            self.drive(endpoint, &options, &request_id).instrument(span).await?;
        Ok(Completed { value, request_id, attempts })
    }

    async fn drive(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        request_id: &str,
    ) -> Result<(Value, u32), ApiError> {
        let url = self.resolver.url_for(endpoint);
        let max_attempts = self.config.retry.max_attempts();
        let mut state = CallState::Attempting { attempt: 1 };

        loop {
            state = match state {
                CallState::Attempting { attempt } => {
                    let started = Instant::now();
                    let outcome = self.attempt(&url, options, attempt, max_attempts).await;
                    debug!(
                        attempt,
                        kind = outcome.kind().map_or("ok", ApiErrorKind::label),
                        elapsed_ms = elapsed_ms(started),
                        "attempt finished"
                    );
                    self.transition(outcome, attempt, endpoint, request_id).await
                }
                CallState::BackoffWait { attempt, delay } => {
                    tokio::time::sleep(delay).await;
                    CallState::Attempting { attempt: attempt + 1 }
                }
                CallState::Succeeded { value, attempts } => {
                    debug!(attempts, "request succeeded");
                    return Ok((value, attempts));
                }
                CallState::Failed(err) => {
                    warn!(
                        kind = error_label(&err),
                        status = err.status,
                        attempts = err.attempts,
                        error = %err.detail,
                        "request failed"
                    );
                    return Err(err);
                }
            };
        }
    }

    async fn transition(
        &self,
        outcome: AttemptOutcome,
        attempt: u32,
        endpoint: &str,
        request_id: &str,
    ) -> CallState {
        match outcome {
            AttemptOutcome::Success(value) => CallState::Succeeded { value, attempts: attempt },
            AttemptOutcome::Retryable(failure) if !self.config.retry.is_last(attempt) => {
                let delay = self.config.retry.backoff(attempt);
                warn!(
                    attempt,
                    backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    kind = %failure.kind,
                    error = %failure.message,
                    "attempt failed, retrying"
                );
                CallState::BackoffWait { attempt, delay }
            }
            AttemptOutcome::Retryable(failure) | AttemptOutcome::Fatal(failure) => {
                if failure.kind == ApiErrorKind::AuthExpired {
                    self.credentials.clear_token().await;
                }
                CallState::Failed(ApiError::from_failure(failure, endpoint, request_id, attempt))
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        options: &RequestOptions,
        attempt: u32,
        max_attempts: u32,
    ) -> AttemptOutcome {
        let request = match self.build_request(url, options) {
            Ok(request) => request,
            Err(failure) => return AttemptOutcome::Fatal(failure),
        };

        // Dropping the fetch future on timeout aborts the exchange.
        match tokio::time::timeout(self.config.timeout, self.transport.fetch(request)).await {
            Ok(Ok(response)) => {
                classify_response(response.status.as_u16(), &response.body, attempt, max_attempts)
            }
            Ok(Err(err)) => classify_transport(transport_failure(err), attempt, max_attempts),
            Err(_) => {
                classify_transport(timeout_failure(self.config.timeout), attempt, max_attempts)
            }
        }
    }

    fn build_request(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<reqwest::Request, Failure> {
        let mut headers = if options.is_multipart() {
            self.credentials.auth_headers()
        } else {
            self.credentials.get_headers()
        };
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self.transport.request(options.method.clone(), url).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        builder = match &options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(fields) => {
                builder.multipart(build_form(fields).map_err(invalid_request)?)
            }
        };

        builder.build().map_err(invalid_request)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn timeout_failure(timeout: Duration) -> Failure {
    Failure::new(ApiErrorKind::Timeout, format!("no response within {}ms", timeout.as_millis()))
}

fn transport_failure(err: reqwest::Error) -> Failure {
    let kind = if err.is_timeout() {
        ApiErrorKind::Timeout
    } else if is_network_failure(&err) {
        ApiErrorKind::Network
    } else {
        ApiErrorKind::InvalidRequest
    };
    Failure::new(kind, err.to_string()).with_source(err)
}

fn invalid_request(err: reqwest::Error) -> Failure {
    Failure::new(ApiErrorKind::InvalidRequest, format!("could not build request: {err}"))
        .with_source(err)
}

pub(crate) fn encode<B: Serialize + ?Sized>(endpoint: &str, body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| {
        let failure = Failure::new(
            ApiErrorKind::InvalidRequest,
            format!("could not serialize request body: {err}"),
        )
        .with_source(err);
        ApiError::from_failure(failure, endpoint, new_request_id(), 0)
    })
}

fn decode<T: DeserializeOwned>(
    value: Value,
    endpoint: &str,
    request_id: &str,
    attempts: u32,
) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| {
        let failure =
            Failure::new(ApiErrorKind::Parse, format!("unexpected response shape: {err}"))
                .with_source(err);
        ApiError::from_failure(failure, endpoint, request_id, attempts)
    })
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    resolver: Option<Arc<EndpointResolver>>,
    credentials: Option<Arc<CredentialStore>>,
    config: Option<ExecutorConfig>,
    transport: Option<HttpTransport>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<EndpointResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Arc<CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: HttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client. Without a resolver, the base URL comes from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns error if no credential store was given or the transport
    /// cannot be built
    pub fn build(self) -> Result<ApiClient, PortalError> {
        let credentials = self
            .credentials
            .ok_or_else(|| PortalError::Config("credential store not set".to_string()))?;
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(EndpointResolver::new(EndpointSettings::from_env())));
        let config = self.config.unwrap_or_default();

        match self.transport {
            Some(transport) => {
                Ok(ApiClient::with_transport(transport, resolver, credentials, config))
            }
            None => ApiClient::new(resolver, credentials, config),
        }
    }
}
