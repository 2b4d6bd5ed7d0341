//! # Client Configuration
//!
//! Endpoints, timings and the reconnect policy for the documents client.
//!
//! Values are layered, lowest to highest:
//!
//! 1.  **Resolved defaults**: picked from the [`BuildProfile`] and the
//!     [`DeviceTarget`]. Release builds talk to the production API; debug
//!     builds talk to a local server, reached through `10.0.2.2` from an
//!     Android emulator.
//! 2.  **JSON file**: camelCase keys, every key optional.
//! 3.  **Environment**: `DOCS_*` variables.
//!
//! Binaries put their command-line flags on top of these.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Production REST endpoint.
pub const RELEASE_BASE_URL: &str = "https://api.documents.app";
/// Production WebSocket endpoint.
pub const RELEASE_WS_URL: &str = "wss://api.documents.app/";
/// The host loopback as seen from an Android emulator.
pub const EMULATOR_BASE_URL: &str = "http://10.0.2.2:8080";
/// WebSocket counterpart of [`EMULATOR_BASE_URL`].
pub const EMULATOR_WS_URL: &str = "ws://10.0.2.2:8080/";
/// Local development server.
pub const LOCAL_BASE_URL: &str = "http://localhost:8080";
/// WebSocket counterpart of [`LOCAL_BASE_URL`].
pub const LOCAL_WS_URL: &str = "ws://localhost:8080/";
/// Path of the live notification feed.
pub const DEFAULT_NOTIFICATION_PATH: &str = "notifications";

/// Errors raised while loading or checking a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was being parsed.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An environment variable holds a value of the wrong type.
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// The rejected value.
        value: String,
    },

    /// An endpoint is not a usable URL.
    #[error("invalid {field} '{value}': {reason}")]
    InvalidUrl {
        /// Configuration field holding the URL.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Which build the client is running as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildProfile {
    /// Development build.
    Debug,
    /// Production build.
    Release,
}

impl BuildProfile {
    /// The profile of the running binary.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildProfile::Debug
        } else {
            BuildProfile::Release
        }
    }
}

impl FromStr for BuildProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dev" | "development" => Ok(BuildProfile::Debug),
            "release" | "prod" | "production" => Ok(BuildProfile::Release),
            other => Err(format!("unknown build profile '{}'", other)),
        }
    }
}

/// Where the client runs; only matters for debug endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceTarget {
    /// A physical phone or tablet.
    Device,
    /// An Android emulator, which reaches the host through `10.0.2.2`.
    AndroidEmulator,
    /// A desktop or server host.
    Desktop,
}

impl DeviceTarget {
    /// Best guess for the running binary. Emulators cannot be told apart from
    /// devices at compile time; select [`DeviceTarget::AndroidEmulator`]
    /// explicitly.
    pub fn current() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            DeviceTarget::Device
        } else {
            DeviceTarget::Desktop
        }
    }
}

impl FromStr for DeviceTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "device" => Ok(DeviceTarget::Device),
            "emulator" | "android-emulator" | "androidemulator" => Ok(DeviceTarget::AndroidEmulator),
            "desktop" => Ok(DeviceTarget::Desktop),
            other => Err(format!("unknown device target '{}'", other)),
        }
    }
}

/// What the live feed does after its connection ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// One connection attempt per listener; a closed feed stays closed.
    #[default]
    Never,
    /// Reconnect with exponential backoff.
    Backoff {
        /// Delay before the first retry.
        base: Duration,
        /// Upper bound for any single delay.
        max: Duration,
        /// Consecutive failed attempts before giving up; `None` retries forever.
        max_attempts: Option<u32>,
    },
}

impl ReconnectPolicy {
    /// The wait before retry number `attempt` (zero-based), or `None` when no
    /// further attempt should be made.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Backoff { base, max, max_attempts } => {
                if max_attempts.is_some_and(|limit| attempt >= limit) {
                    return None;
                }
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                Some(base.saturating_mul(factor).min(max))
            }
        }
    }
}

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// REST base URL, without a trailing path.
    pub base_url: String,
    /// WebSocket base URL.
    pub ws_url: String,
    /// Path appended to `ws_url` for the notification feed.
    pub notification_path: String,
    /// How long a notification stays visible.
    pub display_duration_ms: u64,
    /// Pause between two notifications.
    pub cooldown_ms: u64,
    /// Simulated round-trip of a document creation.
    pub create_delay_ms: u64,
    /// HTTP retries for transient failures; `0` disables the retry layer.
    pub http_max_retries: u32,
    /// Whether the live feed reconnects after its connection ends.
    pub reconnect: bool,
    /// First reconnect delay.
    pub reconnect_base_delay_ms: u64,
    /// Reconnect delay cap.
    pub reconnect_max_delay_ms: u64,
    /// Reconnect attempt limit.
    pub reconnect_max_attempts: Option<u32>,
}

/// A partial configuration; every `Some` field overrides the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub ws_url: Option<String>,
    pub notification_path: Option<String>,
    pub display_duration_ms: Option<u64>,
    pub cooldown_ms: Option<u64>,
    pub create_delay_ms: Option<u64>,
    pub http_max_retries: Option<u32>,
    pub reconnect: Option<bool>,
    pub reconnect_base_delay_ms: Option<u64>,
    pub reconnect_max_delay_ms: Option<u64>,
    pub reconnect_max_attempts: Option<u32>,
}

impl ConfigOverrides {
    /// Merges two override sets; `other` wins where it has a value.
    pub fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            base_url: other.base_url.or(self.base_url),
            ws_url: other.ws_url.or(self.ws_url),
            notification_path: other.notification_path.or(self.notification_path),
            display_duration_ms: other.display_duration_ms.or(self.display_duration_ms),
            cooldown_ms: other.cooldown_ms.or(self.cooldown_ms),
            create_delay_ms: other.create_delay_ms.or(self.create_delay_ms),
            http_max_retries: other.http_max_retries.or(self.http_max_retries),
            reconnect: other.reconnect.or(self.reconnect),
            reconnect_base_delay_ms: other.reconnect_base_delay_ms.or(self.reconnect_base_delay_ms),
            reconnect_max_delay_ms: other.reconnect_max_delay_ms.or(self.reconnect_max_delay_ms),
            reconnect_max_attempts: other.reconnect_max_attempts.or(self.reconnect_max_attempts),
        }
    }

    /// Reads overrides from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reads `DOCS_*` overrides through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ConfigOverrides {
            base_url: lookup("DOCS_BASE_URL"),
            ws_url: lookup("DOCS_WS_URL"),
            notification_path: lookup("DOCS_NOTIFICATION_PATH"),
            display_duration_ms: parse_var(&lookup, "DOCS_DISPLAY_DURATION_MS")?,
            cooldown_ms: parse_var(&lookup, "DOCS_COOLDOWN_MS")?,
            create_delay_ms: parse_var(&lookup, "DOCS_CREATE_DELAY_MS")?,
            http_max_retries: parse_var(&lookup, "DOCS_HTTP_MAX_RETRIES")?,
            reconnect: parse_var(&lookup, "DOCS_RECONNECT")?,
            reconnect_base_delay_ms: parse_var(&lookup, "DOCS_RECONNECT_BASE_DELAY_MS")?,
            reconnect_max_delay_ms: parse_var(&lookup, "DOCS_RECONNECT_MAX_DELAY_MS")?,
            reconnect_max_attempts: parse_var(&lookup, "DOCS_RECONNECT_MAX_ATTEMPTS")?,
        })
    }

    /// Reads `DOCS_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                value,
            }),
    }
}

impl ClientConfig {
    /// The defaults for a build profile and device target.
    pub fn resolve(profile: BuildProfile, target: DeviceTarget) -> Self {
        let (base_url, ws_url) = match (profile, target) {
            (BuildProfile::Release, _) => (RELEASE_BASE_URL, RELEASE_WS_URL),
            (BuildProfile::Debug, DeviceTarget::AndroidEmulator) => (EMULATOR_BASE_URL, EMULATOR_WS_URL),
            (BuildProfile::Debug, _) => (LOCAL_BASE_URL, LOCAL_WS_URL),
        };

        ClientConfig {
            base_url: base_url.to_string(),
            ws_url: ws_url.to_string(),
            notification_path: DEFAULT_NOTIFICATION_PATH.to_string(),
            display_duration_ms: 5000,
            cooldown_ms: 2000,
            create_delay_ms: 1000,
            http_max_retries: 0,
            reconnect: false,
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 60_000,
            reconnect_max_attempts: None,
        }
    }

    /// Applies `overrides` on top of `self`.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides {
            base_url,
            ws_url,
            notification_path,
            display_duration_ms,
            cooldown_ms,
            create_delay_ms,
            http_max_retries,
            reconnect,
            reconnect_base_delay_ms,
            reconnect_max_delay_ms,
            reconnect_max_attempts,
        } = overrides;

        if let Some(v) = base_url {
            self.base_url = v;
        }
        if let Some(v) = ws_url {
            self.ws_url = v;
        }
        if let Some(v) = notification_path {
            self.notification_path = v;
        }
        if let Some(v) = display_duration_ms {
            self.display_duration_ms = v;
        }
        if let Some(v) = cooldown_ms {
            self.cooldown_ms = v;
        }
        if let Some(v) = create_delay_ms {
            self.create_delay_ms = v;
        }
        if let Some(v) = http_max_retries {
            self.http_max_retries = v;
        }
        if let Some(v) = reconnect {
            self.reconnect = v;
        }
        if let Some(v) = reconnect_base_delay_ms {
            self.reconnect_base_delay_ms = v;
        }
        if let Some(v) = reconnect_max_delay_ms {
            self.reconnect_max_delay_ms = v;
        }
        if reconnect_max_attempts.is_some() {
            self.reconnect_max_attempts = reconnect_max_attempts;
        }
        self
    }

    /// Layers a JSON file over `self`. A missing file is an error; callers
    /// that treat the file as optional check for it first.
    pub fn with_json_file(self, path: &Path) -> Result<Self, ConfigError> {
        let overrides = ConfigOverrides::from_json_file(path)?;
        log::info!("Loaded client config from {}", path.display());
        Ok(self.apply(overrides))
    }

    /// Layers `DOCS_*` variables read through `lookup` over `self`.
    pub fn with_env_from<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(self.apply(ConfigOverrides::from_env_with(lookup)?))
    }

    /// Layers the process environment over `self`.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        Ok(self.apply(ConfigOverrides::from_env()?))
    }

    /// Checks both endpoints for a usable scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("baseUrl", &self.base_url, &["http", "https"])?;
        check_url("wsUrl", &self.ws_url, &["ws", "wss"])?;
        Ok(())
    }

    /// Full URL of the notification feed.
    pub fn notification_url(&self) -> String {
        format!(
            "{}/{}",
            self.ws_url.trim_end_matches('/'),
            self.notification_path.trim_start_matches('/')
        )
    }

    /// [`display_duration_ms`](Self::display_duration_ms) as a `Duration`.
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_duration_ms)
    }

    /// [`cooldown_ms`](Self::cooldown_ms) as a `Duration`.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// [`create_delay_ms`](Self::create_delay_ms) as a `Duration`.
    pub fn create_delay(&self) -> Duration {
        Duration::from_millis(self.create_delay_ms)
    }

    /// The live feed's reconnect policy.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        if !self.reconnect {
            return ReconnectPolicy::Never;
        }
        ReconnectPolicy::Backoff {
            base: Duration::from_millis(self.reconnect_base_delay_ms),
            max: Duration::from_millis(self.reconnect_max_delay_ms),
            max_attempts: self.reconnect_max_attempts,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(BuildProfile::current(), DeviceTarget::current())
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientConfig
    Base URL: {},
    Notification feed: {},
    Display/cooldown: {}ms/{}ms,
    Create delay: {}ms,
    HTTP retries: {},
    Reconnect: {:?}",
            self.base_url,
            self.notification_url(),
            self.display_duration_ms,
            self.cooldown_ms,
            self.create_delay_ms,
            self.http_max_retries,
            self.reconnect_policy(),
        )
    }
}

fn check_url(field: &'static str, value: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !schemes.contains(&parsed.scheme()) {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("expected one of {:?}", schemes),
        });
    }
    Ok(())
}
