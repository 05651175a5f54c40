//! Connection configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via OIF_CONFIG)
//! 3. Environment variables

use oif_protocol::{
    Password, DEFAULT_PORT, DEFAULT_READ_CHUNK_SIZE, MAX_LINE_LENGTH, PROTOCOL_VERSION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minimum read chunk size (1 KiB).
pub const MIN_READ_CHUNK_SIZE: usize = 1024;

/// Maximum read chunk size (1 MiB).
pub const MAX_READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Settings for one controller connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Controller host name or address.
    pub host: String,
    /// Controller port.
    pub port: u16,
    /// Timeout for establishing the TCP connection (milliseconds).
    pub connect_timeout_ms: u64,
    /// Timeout for reading one reply line (milliseconds).
    pub read_timeout_ms: u64,
    /// Upper bound on a single socket read.
    pub read_chunk_size: usize,
    /// Largest reply line accepted before the connection is dropped.
    pub max_line_length: usize,
    /// Interface version sent in LOGIN.
    pub version: String,
    pub username: String,
    pub password: Password,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 3_000,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            max_line_length: MAX_LINE_LENGTH,
            version: PROTOCOL_VERSION.to_string(),
            username: "sys".to_string(),
            password: Password::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.clamp(MIN_READ_CHUNK_SIZE, MAX_READ_CHUNK_SIZE);
        self
    }

    pub fn with_max_line_length(mut self, size: usize) -> Self {
        self.max_line_length = size;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<Password>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Read chunk size, kept within bounds even if set directly or loaded
    /// from a file.
    pub fn chunk_size(&self) -> usize {
        self.read_chunk_size.clamp(MIN_READ_CHUNK_SIZE, MAX_READ_CHUNK_SIZE)
    }

    /// `host:port` for connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("OIF_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: ConnectionConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `OIF_*` overrides from `lookup`. Values that do not parse are
    /// ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("OIF_HOST") {
            self.host = host;
        }

        if let Some(port) = lookup("OIF_PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }

        if let Some(username) = lookup("OIF_USERNAME") {
            self.username = username;
        }

        if let Some(password) = lookup("OIF_PASSWORD") {
            self.password = Password::new(password);
        }

        if let Some(version) = lookup("OIF_VERSION") {
            self.version = version;
        }

        if let Some(ms) = lookup("OIF_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.connect_timeout_ms = ms;
        }

        if let Some(ms) = lookup("OIF_READ_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.read_timeout_ms = ms;
        }

        if let Some(size) = lookup("OIF_READ_CHUNK_SIZE").and_then(|v| v.parse::<usize>().ok()) {
            self.read_chunk_size = size.clamp(MIN_READ_CHUNK_SIZE, MAX_READ_CHUNK_SIZE);
        }

        if let Some(size) = lookup("OIF_MAX_LINE_LENGTH").and_then(|v| v.parse().ok()) {
            self.max_line_length = size;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationError("host must not be empty".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "read_timeout_ms must be positive".to_string(),
            ));
        }
        if self.max_line_length == 0 {
            return Err(ConfigError::ValidationError(
                "max_line_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
