//! Classified API errors
//!
//! Every failed logical call ends in exactly one [`ApiError`]. Screens render
//! `message` directly; the remaining fields are diagnostics.

use std::fmt;

use thiserror::Error;

/// Categories of API failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Connection refused, DNS failure, reset - retryable
    Network,
    /// Attempt exceeded its deadline - retryable
    Timeout,
    /// 5xx - retryable until the attempt budget is spent
    Server,
    /// 4xx other than 401/403 - fatal
    Client,
    /// 401/403 - fatal, clears stored credentials
    AuthExpired,
    /// 2xx with an unreadable body - fatal
    Parse,
    /// Server rejected specific fields - fatal
    Validation,
    /// Request could not be built (bad URL, header, form part) - never sent
    InvalidRequest,
}

impl ApiErrorKind {
    /// Whether a failure of this kind may succeed if attempted again
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Server)
    }

    /// Stable label for structured logs
    pub const fn label(self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Timeout => "timeout_error",
            Self::Server => "server_error",
            Self::Client => "client_error",
            Self::AuthExpired => "auth_expired",
            Self::Parse => "parse_error",
            Self::Validation => "validation_error",
            Self::InvalidRequest => "invalid_request",
        }
    }

    /// Message shown to the user for kinds with a fixed wording
    const fn canned_message(self) -> Option<&'static str> {
        match self {
            Self::Timeout => {
                Some("Request timed out. Please check your connection and try again.")
            }
            Self::Network => Some("Network error. Please check your connection and try again."),
            Self::AuthExpired => Some("Session expired. Please log in again."),
            _ => None,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal failure of a logical call
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// Human-readable message for the UI
    pub message: String,
    /// Server-provided or generated description of the last failure
    pub detail: String,
    pub status: Option<u16>,
    pub retryable: bool,
    pub endpoint: String,
    pub request_id: String,
    /// Network attempts made before giving up
    pub attempts: u32,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ApiError {
    /// Wrap the last attempt's failure with call metadata
    pub fn from_failure(
        failure: super::classify::Failure,
        endpoint: impl Into<String>,
        request_id: impl Into<String>,
        attempts: u32,
    ) -> Self {
        let super::classify::Failure { kind, message, status, source } = failure;
        let user_message =
            kind.canned_message().map_or_else(|| message.clone(), ToString::to_string);

        Self {
            kind,
            message: user_message,
            detail: message,
            status,
            retryable: kind.is_retryable(),
            endpoint: endpoint.into(),
            request_id: request_id.into(),
            attempts,
            source,
        }
    }

    /// Whether the session was rejected and credentials were dropped
    pub fn is_auth_expired(&self) -> bool {
        self.kind == ApiErrorKind::AuthExpired
    }
}
