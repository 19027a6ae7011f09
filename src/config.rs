//! Configuration management for the OneView exporter.
//!
//! Supports loading configuration from:
//! - TOML configuration files
//! - Environment variables of the form `ONEVIEW_EXPORTER__<SECTION>__<KEY>`,
//!   e.g. `ONEVIEW_EXPORTER__ONEVIEW__ENDPOINT`
//! - The `OV_USERNAME`, `OV_PASSWORD`, `OV_AUTHLOGINDOMAIN` and `OV_ENDPOINT`
//!   variables, which take precedence over everything else

use crate::error::{OneViewError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variables that override `oneview.*` keys.
const OV_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("OV_USERNAME", "oneview.username"),
    ("OV_PASSWORD", "oneview.password"),
    ("OV_AUTHLOGINDOMAIN", "oneview.auth_login_domain"),
    ("OV_ENDPOINT", "oneview.endpoint"),
];

/// OneView appliance connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct OneViewConfig {
    /// Appliance URL including scheme (e.g., "https://oneview.example.com")
    #[serde(default)]
    pub endpoint: String,

    /// Login user name
    #[serde(default)]
    pub username: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Authentication directory (e.g., "LOCAL")
    #[serde(default = "default_auth_login_domain")]
    pub auth_login_domain: String,

    /// Verify TLS certificates (set to false for self-signed certs)
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Sent as `X-API-Version` on every request
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Sent as `If-Match` on every request
    #[serde(default = "default_if_match")]
    pub if_match: String,

    /// Deadline for a single API call in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl OneViewConfig {
    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl std::fmt::Debug for OneViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneViewConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .field("auth_login_domain", &self.auth_login_domain)
            .field("verify_tls", &self.verify_tls)
            .field("api_version", &self.api_version)
            .field("if_match", &self.if_match)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Exporter specific settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExporterConfig {
    /// Address to listen on for metrics endpoint
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            log_level: default_log_level(),
        }
    }
}

/// Polling cadences.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    /// Sleep between count/status cycles
    #[serde(default = "default_inventory_interval")]
    pub inventory_interval_seconds: u64,
    /// Sleep between utilization cycles
    #[serde(default = "default_utilization_interval")]
    pub utilization_interval_seconds: u64,
}

impl CollectorConfig {
    pub fn inventory_interval(&self) -> Duration {
        Duration::from_secs(self.inventory_interval_seconds)
    }

    pub fn utilization_interval(&self) -> Duration {
        Duration::from_secs(self.utilization_interval_seconds)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            inventory_interval_seconds: default_inventory_interval(),
            utilization_interval_seconds: default_utilization_interval(),
        }
    }
}

/// Main configuration structure for the OneView exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// OneView appliance configuration
    pub oneview: OneViewConfig,

    /// Exporter server configuration
    #[serde(default)]
    pub exporter: ExporterConfig,

    /// Collector cadence configuration
    #[serde(default)]
    pub collector: CollectorConfig,
}

fn default_auth_login_domain() -> String {
    "LOCAL".to_string()
}

fn default_verify_tls() -> bool {
    false
}

fn default_api_version() -> u32 {
    800
}

fn default_if_match() -> String {
    "*".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_inventory_interval() -> u64 {
    60
}

fn default_utilization_interval() -> u64 {
    300
}

impl Settings {
    /// Load configuration from a file and environment variables.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to configuration file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use oneview_exporter::config::Settings;
    ///
    /// let settings = Settings::load(Some("config/default.toml")).unwrap();
    /// ```
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ONEVIEW_EXPORTER")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in OV_ENV_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration settings.
    fn validate(&self) -> Result<()> {
        let endpoint = &self.oneview.endpoint;
        if endpoint.is_empty() {
            return Err(invalid("OneView endpoint cannot be empty"));
        }

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(invalid(
                "OneView endpoint must include the http:// or https:// scheme",
            ));
        }

        if self.oneview.username.is_empty() || self.oneview.password.is_empty() {
            return Err(invalid("OneView username and password are required"));
        }

        if self.oneview.timeout_seconds == 0 {
            return Err(invalid("timeout_seconds must be greater than zero"));
        }

        if self.collector.inventory_interval_seconds == 0
            || self.collector.utilization_interval_seconds == 0
        {
            return Err(invalid("collector intervals must be greater than zero"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> OneViewError {
    OneViewError::Config(config::ConfigError::Message(message.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            oneview: OneViewConfig {
                endpoint: "https://localhost".to_string(),
                username: String::new(),
                password: String::new(),
                auth_login_domain: default_auth_login_domain(),
                verify_tls: default_verify_tls(),
                api_version: default_api_version(),
                if_match: default_if_match(),
                timeout_seconds: default_timeout(),
            },
            exporter: ExporterConfig::default(),
            collector: CollectorConfig::default(),
        }
    }
}
