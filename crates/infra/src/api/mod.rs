//! Resilient client for the portal REST API
//!
//! Every screen funnels its network calls through this module. It resolves
//! the backend base URL, owns the bearer token, and runs each logical call
//! through a bounded retry loop with per-attempt timeouts.
//!
//! # Architecture
//!
//! - [`EndpointResolver`]: base URL per runtime platform, resolved once
//! - [`CredentialStore`]: bearer token and cached profile over a
//!   [`CredentialStorage`](jobportal_core::CredentialStorage) adapter
//! - [`ApiClient`]: timeout, retry with linear backoff, classification,
//!   session clearing on 401/403
//! - [`PortalApi`]: typed admin operations
//!
//! Classification itself is pure and lives in `jobportal-core`.

pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod facade;
pub mod request;

pub use client::{ApiClient, ApiClientBuilder, ExecutorConfig};
pub use credentials::CredentialStore;
pub use endpoint::{EndpointResolver, EndpointSettings, Platform};
pub use facade::{ImageUpload, PortalApi};
pub use request::{MultipartField, MultipartValue, RequestBody, RequestOptions};
