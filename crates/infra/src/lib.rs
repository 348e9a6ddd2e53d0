//! # JobPortal Infrastructure
//!
//! I/O side of the JobPortal admin client.
//!
//! This crate contains:
//! - The resilient REST client (endpoint resolution, credential store,
//!   request executor, typed portal operations)
//! - HTTP transport over reqwest
//! - Credential storage adapters (keychain, session file, memory)
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements ports defined in `jobportal-core`
//! - Depends on `jobportal-domain` and `jobportal-core`
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod api;
pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, CredentialStore, EndpointResolver, EndpointSettings,
    ExecutorConfig, ImageUpload, MultipartField, MultipartValue, Platform, PortalApi,
    RequestBody, RequestOptions,
};
pub use context::PortalContext;
pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder, RawResponse};
pub use observability::{error_label, init_tracing};
pub use storage::{build_storage, FileStorage, MemoryStorage};
#[cfg(feature = "keychain")]
pub use storage::KeychainStorage;
