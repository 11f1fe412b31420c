//! Configuration types and loading
//!
//! Sources are layered: built-in defaults, `config/default.toml`,
//! `config/{UPLOADS_ENV}.toml`, then `UPLOADS__*` environment variables.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides (`UPLOADS__FTP__DOMAIN`)
pub const ENV_PREFIX: &str = "UPLOADS";

/// Main application configuration
///
/// The four policy sections are optional: a missing section is reported as a
/// configuration error per request instead of failing startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Transfer backend selection
    #[serde(default)]
    pub transfer: TransferConfig,

    /// FTP endpoint credentials
    #[serde(default)]
    pub ftp: Option<FtpConfig>,

    /// Per-extension size ceilings
    #[serde(default)]
    pub file_max_sizes: Option<Vec<FileSizeConfig>>,

    /// Accepted extensions
    #[serde(default)]
    pub accept_files: Option<Vec<String>>,

    /// Category to folder mapping
    #[serde(default)]
    pub upload_types: Option<Vec<UploadTypeConfig>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size_bytes: 100 * 1024 * 1024, // 100MB
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransferBackend {
    #[default]
    Ftp,
    Local,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    pub backend: TransferBackend,
    /// Root directory for the local backend
    pub local_root: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            backend: TransferBackend::Ftp,
            local_root: "/var/upload-gateway".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FtpConfig {
    /// Host name, optionally with `:port`
    pub domain: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileSizeConfig {
    pub extension: String,
    /// Maximum size in bytes
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadTypeConfig {
    pub upload_type: String,
    pub folder_name: String,
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config file error: {0}")]
    FileError(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::FileError(err.to_string())
    }
}

impl AppConfig {
    /// Load configuration from files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let profile = std::env::var("UPLOADS_ENV").unwrap_or_else(|_| "development".to_string());

        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", profile)).required(false))
            .add_source(Self::environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.check()?;

        tracing::debug!(profile = %profile, "Configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("accept_files")
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.server.max_body_size_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.max_body_size_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.transfer.backend == TransferBackend::Local && self.transfer.local_root.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "transfer.local_root".to_string(),
                message: "required for the local backend".to_string(),
            });
        }
        Ok(())
    }

    /// Get the server address
    ///
    /// Host names are resolved; an unresolvable host falls back to all
    /// interfaces with a warning.
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

        let host = self.server.host.as_str();
        let port = self.server.port;

        if let Ok(ip) = host.parse::<IpAddr>() {
            return SocketAddr::new(ip, port);
        }

        match (host, port).to_socket_addrs().map(|mut addrs| addrs.next()) {
            Ok(Some(addr)) => addr,
            Ok(None) => {
                tracing::warn!(host = %host, "Host resolved to no address, binding 0.0.0.0");
                SocketAddr::new([0, 0, 0, 0].into(), port)
            }
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "Failed to resolve host, binding 0.0.0.0");
                SocketAddr::new([0, 0, 0, 0].into(), port)
            }
        }
    }
}
