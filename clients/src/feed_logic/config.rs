use anyhow::{Context, Result};
use clap::Args;
use lib_docs::configs::{BuildProfile, ClientConfig, ConfigOverrides, DeviceTarget};
use std::path::PathBuf;

/// Config file read from the working directory when `--config-path` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "docs_client.json";

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[clap(long, env = "DOCS_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "DOCS_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "DOCS_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "DOCS_PROFILE", help = "Build profile used to pick default endpoints (debug, release).")]
    pub profile: Option<BuildProfile>,

    #[clap(long, env = "DOCS_TARGET", help = "Device target used to pick default endpoints (device, emulator, desktop).")]
    pub target: Option<DeviceTarget>,

    #[clap(long, env = "DOCS_BASE_URL", help = "REST API base URL.")]
    pub base_url: Option<String>,

    #[clap(long, env = "DOCS_WS_URL", help = "WebSocket base URL.")]
    pub ws_url: Option<String>,

    #[clap(long, env = "DOCS_NOTIFICATION_PATH", help = "Path of the notification feed under the WebSocket URL.")]
    pub notification_path: Option<String>,

    #[clap(long, env = "DOCS_DISPLAY_DURATION_MS", help = "Milliseconds a notification stays visible.")]
    pub display_duration_ms: Option<u64>,

    #[clap(long, env = "DOCS_COOLDOWN_MS", help = "Milliseconds between two notifications.")]
    pub cooldown_ms: Option<u64>,

    #[clap(long, env = "DOCS_CREATE_DELAY_MS", help = "Simulated document creation delay in milliseconds.")]
    pub create_delay_ms: Option<u64>,

    #[clap(long, env = "DOCS_HTTP_MAX_RETRIES", help = "Retries for transient HTTP failures.")]
    pub http_max_retries: Option<u32>,

    #[clap(long, env = "DOCS_RECONNECT", help = "Reconnect the live feed after it closes (true, false).")]
    pub reconnect: Option<bool>,

    #[clap(long, env = "DOCS_RECONNECT_BASE_DELAY_MS", help = "Base delay in milliseconds for live feed reconnect attempts.")]
    pub reconnect_base_delay_ms: Option<u64>,

    #[clap(long, env = "DOCS_RECONNECT_MAX_DELAY_MS", help = "Maximum delay in milliseconds for live feed reconnect attempts.")]
    pub reconnect_max_delay_ms: Option<u64>,

    #[clap(long, env = "DOCS_RECONNECT_MAX_ATTEMPTS", help = "Give up reconnecting after this many failed attempts.")]
    pub reconnect_max_attempts: Option<u32>,
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            ws_url: self.ws_url.clone(),
            notification_path: self.notification_path.clone(),
            display_duration_ms: self.display_duration_ms,
            cooldown_ms: self.cooldown_ms,
            create_delay_ms: self.create_delay_ms,
            http_max_retries: self.http_max_retries,
            reconnect: self.reconnect,
            reconnect_base_delay_ms: self.reconnect_base_delay_ms,
            reconnect_max_delay_ms: self.reconnect_max_delay_ms,
            reconnect_max_attempts: self.reconnect_max_attempts,
        }
    }
}

/// Everything a binary needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub log_dir: PathBuf,
    pub log_level: String,
    /// The config file that was layered in, if any.
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Reports where the configuration came from. Call once the logger is installed.
    pub fn log_sources(&self) {
        match &self.config_file {
            Some(path) => log::info!("Loaded config file {}", path.display()),
            None => log::info!(
                "Config file not found at {}. Using defaults and environment/CLI variables.",
                DEFAULT_CONFIG_FILE
            ),
        }
        log::info!("{}", self.client);
    }
}

pub fn load_config(args: &ConfigArgs) -> Result<Settings> {
    // 1. Resolve defaults for this build and device
    let profile = args.profile.unwrap_or_else(BuildProfile::current);
    let target = args.target.unwrap_or_else(DeviceTarget::current);
    let mut client = ClientConfig::resolve(profile, target);
    let mut config_file = None;

    // 2. Layer the config file. An explicit path must exist; the default one is optional.
    match &args.config_path {
        Some(path) => {
            client = client
                .with_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config_file = Some(path.clone());
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if path.exists() {
                client = client.with_json_file(&path)?;
                config_file = Some(path);
            }
        }
    }

    // 3. Environment variables and CLI arguments; clap has already merged the two.
    client = client.apply(args.overrides());
    client.validate()?;

    let log_dir = args.log_dir.clone().unwrap_or_else(default_log_dir);
    let log_level = args.log_level.clone().unwrap_or_else(|| "info".to_string());

    Ok(Settings {
        client,
        log_dir,
        log_level,
        config_file,
    })
}

fn default_log_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("docs_client").join("logs"),
        None => PathBuf::from("./logs"),
    }
}
