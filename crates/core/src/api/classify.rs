//! Attempt classification
//!
//! Turns the result of one network attempt into an [`AttemptOutcome`]. These
//! functions are pure: side effects driven by the outcome (credential
//! clearing, backoff) belong to the executor.
//!
//! Precedence for failure messages taken from a response body:
//! 1. `errors: [{ msg | message }]` joined with `", "`
//! 2. `message`
//! 3. `error`
//! 4. a generated `Request failed with status N`

use serde_json::Value;

use super::errors::ApiErrorKind;

/// Result of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Value),
    /// Worth another attempt if the budget allows
    Retryable(Failure),
    /// Ends the logical call
    Fatal(Failure),
}

impl AttemptOutcome {
    /// Failure kind, if this attempt failed
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Retryable(failure) | Self::Fatal(failure) => Some(failure.kind),
        }
    }
}

/// What went wrong in one attempt
#[derive(Debug)]
pub struct Failure {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Failure {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), status: None, source: None }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Classify a received HTTP response.
///
/// `attempt` is 1-indexed. A status in `500..599` is retryable unless
/// `attempt` is the last one; 599 itself is a fatal client error. 401/403 are
/// fatal regardless of the remaining budget.
pub fn classify_response(
    status: u16,
    body: &[u8],
    attempt: u32,
    max_attempts: u32,
) -> AttemptOutcome {
    let is_last = attempt >= max_attempts;

    match status {
        200..=299 => parse_success(status, body),
        401 | 403 => AttemptOutcome::Fatal(
            Failure::new(ApiErrorKind::AuthExpired, failure_message(status, body))
                .with_status(status),
        ),
        500..=598 => {
            let failure =
                Failure::new(ApiErrorKind::Server, failure_message(status, body)).with_status(status);
            if is_last {
                AttemptOutcome::Fatal(failure)
            } else {
                AttemptOutcome::Retryable(failure)
            }
        }
        _ => {
            let field_errors = field_errors(body);
            let failure = if field_errors.is_empty() {
                Failure::new(ApiErrorKind::Client, failure_message(status, body))
            } else {
                Failure::new(ApiErrorKind::Validation, field_errors.join(", "))
            };
            AttemptOutcome::Fatal(failure.with_status(status))
        }
    }
}

/// Classify an attempt that produced no response (connection failure or
/// timeout).
///
/// Network and timeout failures are retryable while attempts remain; every
/// other kind is fatal.
pub fn classify_transport(failure: Failure, attempt: u32, max_attempts: u32) -> AttemptOutcome {
    if failure.kind.is_retryable() && attempt < max_attempts {
        AttemptOutcome::Retryable(failure)
    } else {
        AttemptOutcome::Fatal(failure)
    }
}

fn parse_success(status: u16, body: &[u8]) -> AttemptOutcome {
    if body.iter().all(u8::is_ascii_whitespace) {
        return AttemptOutcome::Success(Value::Null);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => AttemptOutcome::Success(value),
        Err(err) => AttemptOutcome::Fatal(
            Failure::new(ApiErrorKind::Parse, format!("Invalid JSON in response: {err}"))
                .with_status(status)
                .with_source(err),
        ),
    }
}

/// Best message the server gave us, or a generated one
pub fn failure_message(status: u16, body: &[u8]) -> String {
    server_message(body).unwrap_or_else(|| format!("Request failed with status {status}"))
}

/// Message carried by an error body, if any
pub fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    let field_errors = collect_field_errors(&value);
    if !field_errors.is_empty() {
        return Some(field_errors.join(", "));
    }

    ["message", "error"].iter().find_map(|key| {
        value.get(key).and_then(Value::as_str).map(str::trim).filter(|m| !m.is_empty()).map(String::from)
    })
}

/// Messages from an `errors` array, in order
pub fn field_errors(body: &[u8]) -> Vec<String> {
    serde_json::from_slice::<Value>(body).map(|value| collect_field_errors(&value)).unwrap_or_default()
}

fn collect_field_errors(value: &Value) -> Vec<String> {
    let Some(errors) = value.get("errors").and_then(Value::as_array) else {
        return Vec::new();
    };

    errors
        .iter()
        .filter_map(|entry| match entry {
            Value::String(message) => Some(message.as_str()),
            Value::Object(_) => {
                entry.get("msg").or_else(|| entry.get("message")).and_then(Value::as_str)
            }
            _ => None,
        })
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn success_parses_json() {
        let outcome = classify_response(200, br#"{"ok":true}"#, 1, 3);
        match outcome {
            AttemptOutcome::Success(value) => assert_eq!(value, json!({"ok": true})),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn success_with_empty_body_is_null() {
        assert!(matches!(classify_response(204, b"", 1, 3), AttemptOutcome::Success(Value::Null)));
        assert!(matches!(classify_response(200, b"  \n", 1, 3), AttemptOutcome::Success(Value::Null)));
    }

    #[test]
    fn unparseable_success_is_fatal_parse_error() {
        let outcome = classify_response(200, b"<html>gateway</html>", 1, 3);
        match outcome {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Parse);
                assert_eq!(failure.status, Some(200));
                assert!(failure.source.is_some());
            }
            other => panic!("expected fatal parse error, got {other:?}"),
        }
    }

    #[test]
    fn auth_failures_are_fatal_on_any_attempt() {
        for status in [401, 403] {
            for attempt in 1..=3 {
                let outcome = classify_response(status, b"", attempt, 3);
                assert!(matches!(
                    outcome,
                    AttemptOutcome::Fatal(Failure { kind: ApiErrorKind::AuthExpired, .. })
                ));
            }
        }
    }

    #[test]
    fn server_errors_retry_until_last_attempt() {
        assert!(matches!(classify_response(503, b"", 1, 3), AttemptOutcome::Retryable(_)));
        assert!(matches!(classify_response(500, b"", 2, 3), AttemptOutcome::Retryable(_)));

        match classify_response(502, b"", 3, 3) {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Server);
                assert_eq!(failure.message, "Request failed with status 502");
            }
            other => panic!("expected fatal server error, got {other:?}"),
        }
    }

    #[test]
    fn status_599_is_fatal_on_first_attempt() {
        match classify_response(599, b"", 1, 3) {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Client);
                assert_eq!(failure.status, Some(599));
            }
            other => panic!("expected fatal client error, got {other:?}"),
        }
        assert!(matches!(classify_response(598, b"", 1, 3), AttemptOutcome::Retryable(_)));
    }

    #[test]
    fn malformed_body_does_not_change_server_classification() {
        assert!(matches!(classify_response(500, b"{not json", 1, 3), AttemptOutcome::Retryable(_)));
    }

    #[test]
    fn client_error_uses_server_message() {
        let payload = body(&json!({"message": "Job not found"}));
        match classify_response(404, &payload, 1, 3) {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Client);
                assert_eq!(failure.message, "Job not found");
                assert_eq!(failure.status, Some(404));
            }
            other => panic!("expected fatal client error, got {other:?}"),
        }
    }

    #[test]
    fn field_errors_take_precedence_over_message() {
        let payload = body(&json!({
            "message": "Validation failed",
            "errors": [{"msg": "Title is required"}, {"message": "Salary must be positive"}]
        }));

        match classify_response(422, &payload, 1, 3) {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Validation);
                assert_eq!(failure.message, "Title is required, Salary must be positive");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn field_errors_used_for_final_server_failure() {
        let payload = body(&json!({"errors": ["Database unavailable"]}));
        match classify_response(500, &payload, 3, 3) {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Server);
                assert_eq!(failure.message, "Database unavailable");
            }
            other => panic!("expected fatal server error, got {other:?}"),
        }
    }

    #[test]
    fn empty_errors_array_falls_back_to_client_error() {
        let payload = body(&json!({"errors": [], "error": "Bad request"}));
        match classify_response(400, &payload, 1, 3) {
            AttemptOutcome::Fatal(failure) => {
                assert_eq!(failure.kind, ApiErrorKind::Client);
                assert_eq!(failure.message, "Bad request");
            }
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[test]
    fn transport_failures_retry_while_budget_remains() {
        let timeout = Failure::new(ApiErrorKind::Timeout, "timed out");
        assert!(matches!(classify_transport(timeout, 1, 3), AttemptOutcome::Retryable(_)));

        let network = Failure::new(ApiErrorKind::Network, "refused");
        let outcome = classify_transport(network, 3, 3);
        assert_eq!(outcome.kind(), Some(ApiErrorKind::Network));
        assert!(matches!(outcome, AttemptOutcome::Fatal(_)));

        let invalid = Failure::new(ApiErrorKind::InvalidRequest, "bad header");
        assert!(matches!(classify_transport(invalid, 1, 3), AttemptOutcome::Fatal(_)));
    }
}
