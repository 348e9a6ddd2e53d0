use jobportal_domain::constants::USER_AGENT;
use jobportal_domain::PortalError;
use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, StatusCode};
use tracing::debug;

use crate::errors::InfraError;

/// Status and fully-read body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Single-shot HTTP transport.
///
/// Retries, deadlines and classification are owned by the API client; this
/// type only sends one request and reads its body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Start building a new transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, PortalError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send the request and read the whole body.
    ///
    /// Dropping the returned future aborts the exchange.
    pub async fn fetch(&self, request: Request) -> Result<RawResponse, reqwest::Error> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!(%method, %url, %status, bytes = body.len(), "received HTTP response");
        Ok(RawResponse { status, body })
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    user_agent: String,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self { user_agent: USER_AGENT.to_string() }
    }
}

impl HttpTransportBuilder {
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`PortalError::Config`] when reqwest rejects the client
    /// configuration, e.g. the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpTransport, PortalError> {
        let client = ReqwestClient::builder()
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(|err| PortalError::from(InfraError::from(err)))?;

        Ok(HttpTransport { client })
    }
}

/// Whether a transport error means the server was never reached or the
/// exchange was cut short, as opposed to a malformed request.
pub fn is_network_failure(err: &reqwest::Error) -> bool {
    if err.is_timeout()
        || err.is_request()
        || err.is_body()
        || err.is_decode()
        || err.is_redirect()
    {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn fetch_reads_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"id\":1}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new().expect("transport");
        let request = transport.request(Method::GET, server.uri()).build().unwrap();
        let response = transport.fetch(request).await.expect("response");

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, b"{\"id\":1}");
    }

    #[tokio::test]
    async fn fetch_does_not_retry_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new().expect("transport");
        let request = transport.request(Method::GET, server.uri()).build().unwrap();
        let response = transport.fetch(request).await.expect("response");

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "portal-test/1.0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::builder()
            .user_agent("portal-test/1.0")
            .build()
            .expect("transport");

        let request = transport.request(Method::GET, server.uri()).build().unwrap();
        let response = transport.fetch(request).await.expect("response");
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn refused_connection_is_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let transport = HttpTransport::new().expect("transport");
        let request = transport.request(Method::GET, format!("http://{addr}")).build().unwrap();
        let err = transport.fetch(request).await.unwrap_err();

        assert!(is_network_failure(&err));
    }
}
