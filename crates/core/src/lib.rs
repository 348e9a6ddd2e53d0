//! # JobPortal Core
//!
//! Pure request-policy logic - no network or storage code.
//!
//! This crate contains:
//! - The classified error taxonomy surfaced to every screen
//! - Response/transport classification (`(status, body) -> outcome`)
//! - Retry policy and request correlation ids
//! - Port interfaces (traits) for credential persistence
//!
//! ## Architecture Principles
//! - Only depends on `jobportal-domain`
//! - No HTTP, keychain, or filesystem code
//! - Classification is independently testable without a store or server

pub mod api;
pub mod credentials;

pub use api::classify::{
    classify_response, classify_transport, failure_message, field_errors, server_message,
    AttemptOutcome, Failure,
};
pub use api::errors::{ApiError, ApiErrorKind};
pub use api::retry::{new_request_id, RetryPolicy};
pub use credentials::ports::CredentialStorage;
