use crate::address::WILDCARD;
use crate::nas::{Nas, NasAddressKind};
use ipnetwork::IpNetwork;
use crate::transaction::TransactionConfig;
use radius_proto::{AttributeType, DecodeOptions, Strictness, UnknownAttributePolicy, ValidationConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User configuration
#[derive(Clone, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration
///
/// Only deserialized: NAS secrets and user passwords are never written back out.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server listen address
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Server listen port
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,

    /// Maximum number of packets handled at once (default: 64)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How long shutdown waits for in-flight packets, in milliseconds (default: 10000)
    #[serde(default = "default_dispose_timeout_ms")]
    pub dispose_timeout_ms: u64,

    /// Duplicate request window in milliseconds (default: 30000)
    #[serde(default = "default_duplicate_timeout_ms")]
    pub duplicate_timeout_ms: u64,

    /// Transaction sweep interval in milliseconds (default: 300000)
    #[serde(default = "default_transaction_cleanup_interval_ms")]
    pub transaction_cleanup_interval_ms: u64,

    /// Drop unregistered attribute types instead of rejecting the packet
    #[serde(default)]
    pub skip_unknown_attributes: bool,

    /// Per-attribute validation toggles, keyed by attribute name (e.g. "Framed-MTU")
    #[serde(default)]
    pub attribute_validation: HashMap<String, Strictness>,

    /// Known RADIUS clients
    #[serde(default)]
    pub nas: Vec<Nas>,

    /// List of users for authentication
    #[serde(default)]
    pub users: Vec<User>,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    1812 // Standard RADIUS authentication port
}

fn default_concurrency() -> usize {
    64
}

fn default_dispose_timeout_ms() -> u64 {
    10_000
}

fn default_duplicate_timeout_ms() -> u64 {
    30_000
}

fn default_transaction_cleanup_interval_ms() -> u64 {
    300_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            log_level: None,
            concurrency: default_concurrency(),
            dispose_timeout_ms: default_dispose_timeout_ms(),
            duplicate_timeout_ms: default_duplicate_timeout_ms(),
            transaction_cleanup_interval_ms: default_transaction_cleanup_interval_ms(),
            skip_unknown_attributes: false,
            attribute_validation: HashMap::new(),
            nas: vec![],
            users: vec![],
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr: IpAddr = self
            .listen_address
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid IP address: {}", self.listen_address)))?;
        Ok(SocketAddr::new(addr, self.listen_port))
    }

    pub fn dispose_timeout(&self) -> Duration {
        Duration::from_millis(self.dispose_timeout_ms)
    }

    pub fn transaction_config(&self) -> TransactionConfig {
        TransactionConfig {
            duplicate_timeout: Duration::from_millis(self.duplicate_timeout_ms),
            cleanup_interval: Duration::from_millis(self.transaction_cleanup_interval_ms),
        }
    }

    /// Strictness table built from `attribute_validation`
    pub fn validation_config(&self) -> Result<ValidationConfig, ConfigError> {
        let mut validation = ValidationConfig::strict();
        for (name, strictness) in &self.attribute_validation {
            let attr_type = AttributeType::from_name(name)
                .ok_or_else(|| ConfigError::Invalid(format!("Unknown attribute in attribute_validation: {}", name)))?;
            validation.set(attr_type, *strictness);
        }
        Ok(validation)
    }

    pub fn decode_options(&self) -> Result<DecodeOptions, ConfigError> {
        let unknown_attributes = if self.skip_unknown_attributes {
            UnknownAttributePolicy::Skip
        } else {
            UnknownAttributePolicy::Reject
        };
        Ok(DecodeOptions::default()
            .with_validation(self.validation_config()?)
            .with_unknown_attributes(unknown_attributes))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.listen_port == 0 {
            return Err(ConfigError::Invalid("Port cannot be 0".to_string()));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("Concurrency must be at least 1".to_string()));
        }

        for nas in &self.nas {
            if nas.short_name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "NAS {} has empty short_name",
                    nas.address.value
                )));
            }
            if nas.secret.is_empty() {
                return Err(ConfigError::Invalid(format!("NAS {} has empty secret", nas.short_name)));
            }
            Self::validate_nas_address(nas)?;
        }

        self.validation_config()?;

        for user in &self.users {
            if user.username.is_empty() {
                return Err(ConfigError::Invalid("User has empty username".to_string()));
            }
        }

        Ok(())
    }

    fn validate_nas_address(nas: &Nas) -> Result<(), ConfigError> {
        let value = nas.address.value.as_str();
        let valid = match nas.address.kind {
            // Anything without a prefix may be a hostname
            NasAddressKind::IpAddr if value.contains('/') => value.parse::<IpNetwork>().is_ok(),
            NasAddressKind::IpAddr => !value.is_empty(),
            NasAddressKind::Ipv4Addr => value == WILDCARD || value.parse::<Ipv4Addr>().is_ok(),
            NasAddressKind::Ipv6Addr => value == WILDCARD || value.parse::<Ipv6Addr>().is_ok(),
        };

        if valid {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "NAS {} has invalid {} address: {}",
                nas.short_name, nas.address.kind, value
            )))
        }
    }
}
