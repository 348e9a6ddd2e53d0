//! Backend base-URL resolution
//!
//! Resolution order:
//! 1. A value set through [`EndpointResolver::override_base_url`]
//! 2. An explicit full base URL (`JOBPORTAL_API_URL` / `api.base_url`)
//! 3. A host-only override, combined with the fixed port and `/api` prefix
//! 4. The default for the detected runtime platform
//! 5. [`FALLBACK_BASE_URL`]
//!
//! Resolution never fails: anything unusable is logged and skipped.

use jobportal_domain::constants::{
    ANDROID_EMULATOR_HOST, API_PATH_PREFIX, API_PORT, DEVICE_HOST, FALLBACK_BASE_URL,
    IOS_SIMULATOR_HOST, WEB_HOST,
};
use jobportal_domain::{impl_wire_enum_conversions, ApiConfig};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::loader::{ENV_API_HOST, ENV_API_URL, ENV_PLATFORM};

/// Runtime the client is running in. `localhost` means something different
/// on each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    AndroidEmulator,
    IosSimulator,
    Device,
}

impl_wire_enum_conversions!(Platform {
    Web => "web" | "browser" | "desktop",
    AndroidEmulator => "android-emulator" | "android_emulator" | "android",
    IosSimulator => "ios-simulator" | "ios_simulator" | "ios",
    Device => "device" | "mobile",
});

impl Platform {
    /// Platform from a configured name, or from the compile target when none
    /// is configured. `None` when the configured name is not recognised.
    pub fn detect(configured: Option<&str>) -> Option<Self> {
        match configured.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => match value.parse() {
                Ok(platform) => Some(platform),
                Err(err) => {
                    warn!(error = %err, "unrecognised platform, using fallback endpoint");
                    None
                }
            },
            None => Some(Self::from_target()),
        }
    }

    const fn from_target() -> Self {
        if cfg!(target_os = "android") {
            Self::AndroidEmulator
        } else if cfg!(target_os = "ios") {
            Self::IosSimulator
        } else {
            Self::Web
        }
    }

    /// Host the backend is reachable at from this platform
    pub const fn default_host(self) -> &'static str {
        match self {
            Self::Web => WEB_HOST,
            Self::AndroidEmulator => ANDROID_EMULATOR_HOST,
            Self::IosSimulator => IOS_SIMULATOR_HOST,
            Self::Device => DEVICE_HOST,
        }
    }

    pub fn default_base_url(self) -> String {
        base_url_for_host(self.default_host())
    }
}

fn base_url_for_host(host: &str) -> String {
    format!("http://{host}:{API_PORT}{API_PATH_PREFIX}")
}

/// Raw inputs to base-URL resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSettings {
    pub base_url: Option<String>,
    pub host: Option<String>,
    pub platform: Option<String>,
}

impl EndpointSettings {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            host: config.host.clone(),
            platform: config.platform.clone(),
        }
    }

    /// Settings taken only from the process environment
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(ENV_API_URL).ok(),
            host: std::env::var(ENV_API_HOST).ok(),
            platform: std::env::var(ENV_PLATFORM).ok(),
        }
    }

    fn resolve(&self) -> String {
        if let Some(url) = non_blank(self.base_url.as_deref()) {
            match Url::parse(url) {
                Ok(_) => return normalize(url),
                Err(err) => warn!(url, error = %err, "ignoring invalid base URL override"),
            }
        }

        if let Some(host) = non_blank(self.host.as_deref()) {
            let candidate = base_url_for_host(host);
            match Url::parse(&candidate) {
                Ok(_) => return candidate,
                Err(err) => warn!(host, error = %err, "ignoring invalid host override"),
            }
        }

        Platform::detect(self.platform.as_deref())
            .map_or_else(|| FALLBACK_BASE_URL.to_string(), Platform::default_base_url)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Resolves the backend base URL once and caches it for the life of the
/// resolver.
#[derive(Debug)]
pub struct EndpointResolver {
    settings: EndpointSettings,
    cached: RwLock<Option<String>>,
}

impl EndpointResolver {
    pub fn new(settings: EndpointSettings) -> Self {
        Self { settings, cached: RwLock::new(None) }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(EndpointSettings::from_config(config))
    }

    /// Resolver pinned to a known base URL (tests, production deployments)
    pub fn fixed(base_url: impl Into<String>) -> Self {
        let resolver = Self::new(EndpointSettings::default());
        resolver.override_base_url(base_url);
        resolver
    }

    /// Base URL for every request; resolved on first call, cached after.
    pub fn resolve_base_url(&self) -> String {
        if let Some(url) = self.cached.read().as_ref() {
            return url.clone();
        }

        let mut cached = self.cached.write();
        if let Some(url) = cached.as_ref() {
            return url.clone();
        }

        let url = self.settings.resolve();
        info!(base_url = %url, "resolved API base URL");
        *cached = Some(url.clone());
        url
    }

    /// Replace the cached base URL unconditionally.
    pub fn override_base_url(&self, url: impl Into<String>) {
        let url = normalize(&url.into());
        debug!(base_url = %url, "overriding API base URL");
        *self.cached.write() = Some(url);
    }

    /// Drop the cached value; the next call re-resolves from settings.
    pub fn reset(&self) {
        *self.cached.write() = None;
    }

    /// Absolute URL for an endpoint path. Absolute `http(s)` endpoints are
    /// returned unchanged.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        let base = self.resolve_base_url();
        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            base
        } else {
            format!("{base}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(
        base_url: Option<&str>,
        host: Option<&str>,
        platform: Option<&str>,
    ) -> EndpointSettings {
        EndpointSettings {
            base_url: base_url.map(String::from),
            host: host.map(String::from),
            platform: platform.map(String::from),
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = EndpointResolver::new(settings(None, None, Some("web")));
        let first = resolver.resolve_base_url();
        let second = resolver.resolve_base_url();
        assert_eq!(first, second);
        assert_eq!(first, "http://localhost:5000/api");
    }

    #[test]
    fn override_replaces_cached_value() {
        let resolver = EndpointResolver::new(settings(None, None, Some("web")));
        resolver.resolve_base_url();

        resolver.override_base_url("https://x");
        assert_eq!(resolver.resolve_base_url(), "https://x");
    }

    #[test]
    fn full_url_beats_host_and_platform() {
        let resolver = EndpointResolver::new(settings(
            Some("https://api.portal.example/api/"),
            Some("10.0.0.7"),
            Some("android"),
        ));
        assert_eq!(resolver.resolve_base_url(), "https://api.portal.example/api");
    }

    #[test]
    fn host_override_uses_fixed_port_and_prefix() {
        let resolver = EndpointResolver::new(settings(None, Some("10.0.0.7"), Some("device")));
        assert_eq!(resolver.resolve_base_url(), "http://10.0.0.7:5000/api");
    }

    #[test]
    fn invalid_full_url_falls_through() {
        let resolver = EndpointResolver::new(settings(Some("not a url"), None, Some("android")));
        assert_eq!(resolver.resolve_base_url(), "http://10.0.2.2:5000/api");
    }

    #[test]
    fn blank_values_are_ignored() {
        let resolver = EndpointResolver::new(settings(Some("  "), Some(""), Some("ios")));
        assert_eq!(resolver.resolve_base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn each_platform_has_its_own_default() {
        assert_eq!(Platform::Web.default_base_url(), "http://localhost:5000/api");
        assert_eq!(Platform::AndroidEmulator.default_base_url(), "http://10.0.2.2:5000/api");
        assert_eq!(Platform::IosSimulator.default_base_url(), "http://localhost:5000/api");
        assert_eq!(Platform::Device.default_base_url(), "http://192.168.1.100:5000/api");
    }

    #[test]
    fn unknown_platform_uses_fallback() {
        assert_eq!(Platform::detect(Some("playstation")), None);
        let resolver = EndpointResolver::new(settings(None, None, Some("playstation")));
        assert_eq!(resolver.resolve_base_url(), FALLBACK_BASE_URL);
    }

    #[test]
    fn missing_platform_uses_compile_target() {
        assert!(Platform::detect(None).is_some());
        assert!(Platform::detect(Some(" ")).is_some());
    }

    #[test]
    fn reset_forces_re_resolution() {
        let resolver = EndpointResolver::new(settings(None, Some("10.1.1.1"), None));
        resolver.override_base_url("https://staging.portal.example/api");
        resolver.reset();
        assert_eq!(resolver.resolve_base_url(), "http://10.1.1.1:5000/api");
    }

    #[test]
    fn url_for_joins_paths() {
        let resolver = EndpointResolver::fixed("http://localhost:5000/api/");
        assert_eq!(resolver.url_for("/jobs"), "http://localhost:5000/api/jobs");
        assert_eq!(resolver.url_for("jobs/1"), "http://localhost:5000/api/jobs/1");
        assert_eq!(resolver.url_for(""), "http://localhost:5000/api");
        assert_eq!(resolver.url_for("https://cdn.example/x"), "https://cdn.example/x");
    }
}
