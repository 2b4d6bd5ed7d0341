//! # Configuration Modules
//!
//! Client settings: endpoints resolved per build profile and device, layered
//! with a JSON file and `DOCS_*` environment variables.

/// Endpoint resolution, layering and the reconnect policy.
pub mod config_client;

pub use config_client::{
    BuildProfile, ClientConfig, ConfigError, ConfigOverrides, DeviceTarget, ReconnectPolicy,
};
