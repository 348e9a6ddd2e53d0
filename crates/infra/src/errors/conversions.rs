//! Conversions from external infrastructure errors into domain errors.

use jobportal_domain::PortalError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PortalError);

impl From<InfraError> for PortalError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PortalError> for InfraError {
    fn from(value: PortalError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPortalError {
    fn into_portal(self) -> PortalError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → PortalError */
/* -------------------------------------------------------------------------- */

impl IntoPortalError for std::io::Error {
    fn into_portal(self) -> PortalError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => PortalError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                PortalError::Storage(format!("permission denied: {self}"))
            }
            _ => PortalError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(value.into_portal())
    }
}

impl From<tempfile::PersistError> for InfraError {
    fn from(value: tempfile::PersistError) -> Self {
        Self(PortalError::Storage(format!("failed to replace session file: {}", value.error)))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → PortalError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(PortalError::Serialization(value.to_string()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        Self(PortalError::Config(format!("Invalid TOML format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → PortalError */
/* -------------------------------------------------------------------------- */

#[cfg(feature = "keychain")]
impl IntoPortalError for keyring::Error {
    fn into_portal(self) -> PortalError {
        use keyring::Error as KE;

        let description = self.to_string();

        match self {
            KE::NoEntry => PortalError::NotFound("keychain entry not found".into()),
            KE::BadEncoding(_) => {
                PortalError::Storage("credential in keychain is not valid UTF-8".into())
            }
            KE::TooLong(name, limit) => PortalError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            KE::Invalid(attr, reason) => {
                PortalError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            KE::PlatformFailure(err) => {
                PortalError::Storage(format!("keychain platform error: {err}"))
            }
            KE::NoStorageAccess(err) => {
                PortalError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => PortalError::Storage(description),
        }
    }
}

#[cfg(feature = "keychain")]
impl From<keyring::Error> for InfraError {
    fn from(value: keyring::Error) -> Self {
        Self(value.into_portal())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PortalError */
/* -------------------------------------------------------------------------- */

impl IntoPortalError for HttpError {
    fn into_portal(self) -> PortalError {
        if self.is_builder() {
            return PortalError::Config(format!("invalid HTTP client configuration: {self}"));
        }

        if self.is_timeout() {
            return PortalError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return PortalError::Network("HTTP connection failure".into());
        }

        PortalError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_portal())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
