//! Upload Policy
//!
//! Read-only view of the configured upload rules. Built once at startup and
//! shared between requests behind an `Arc`.

use std::collections::{HashMap, HashSet};

use ug_core::config::{AppConfig, FtpConfig};

/// Credentials for the remote store
#[derive(Clone, PartialEq, Eq)]
pub struct TransferEndpoint {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl TransferEndpoint {
    pub const DEFAULT_PORT: u16 = 21;

    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build from config; `None` unless host, user name and password are all set
    pub fn from_config(config: &FtpConfig) -> Option<Self> {
        Some(Self::new(
            config.domain.clone()?,
            config.user_name.clone()?,
            config.password.clone()?,
        ))
    }

    /// `host:port` for connecting
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, Self::DEFAULT_PORT)
        }
    }
}

impl std::fmt::Debug for TransferEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEndpoint")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Upload policy
#[derive(Debug, Clone, Default)]
pub struct UploadPolicy {
    endpoint: Option<TransferEndpoint>,
    size_limits: Option<HashMap<String, u64>>,
    accepted_extensions: Option<HashSet<String>>,
    categories: Option<HashMap<String, String>>,
}

impl UploadPolicy {
    /// An empty policy; every section is missing
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut policy = Self::new();

        policy.endpoint = config.ftp.as_ref().and_then(TransferEndpoint::from_config);

        if let Some(sizes) = &config.file_max_sizes {
            policy = policy.with_size_limits(sizes.iter().map(|s| (s.extension.as_str(), s.size)));
        }
        if let Some(extensions) = &config.accept_files {
            policy = policy.with_accepted_extensions(extensions.iter().map(String::as_str));
        }
        if let Some(types) = &config.upload_types {
            policy = policy.with_categories(
                types
                    .iter()
                    .map(|t| (t.upload_type.as_str(), t.folder_name.as_str())),
            );
        }

        policy
    }

    pub fn with_endpoint(mut self, endpoint: TransferEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set size ceilings; extensions are kept verbatim and the first entry per extension wins
    pub fn with_size_limits<'a>(mut self, limits: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let mut table = HashMap::new();
        for (extension, size) in limits {
            table.entry(extension.to_string()).or_insert(size);
        }
        self.size_limits = Some(table);
        self
    }

    /// Set accepted extensions, kept verbatim
    pub fn with_accepted_extensions<'a>(mut self, extensions: impl IntoIterator<Item = &'a str>) -> Self {
        self.accepted_extensions = Some(extensions.into_iter().map(str::to_string).collect());
        self
    }

    /// Set category folders; labels are kept verbatim and the first entry per label wins
    pub fn with_categories<'a>(mut self, categories: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = HashMap::new();
        for (category, folder) in categories {
            table
                .entry(category.to_string())
                .or_insert_with(|| folder.to_string());
        }
        self.categories = Some(table);
        self
    }

    pub fn endpoint(&self) -> Option<&TransferEndpoint> {
        self.endpoint.as_ref()
    }

    /// Names of the policy sections that are not configured
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint.is_none() {
            missing.push("ftp");
        }
        if self.size_limits.is_none() {
            missing.push("file_max_sizes");
        }
        if self.accepted_extensions.is_none() {
            missing.push("accept_files");
        }
        if self.categories.is_none() {
            missing.push("upload_types");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_sections().is_empty()
    }

    /// Whether the extension is accepted; configured entries compare exactly
    pub fn accepts(&self, extension: &str) -> bool {
        self.accepted_extensions
            .as_ref()
            .is_some_and(|set| set.contains(extension))
    }

    /// Maximum size in bytes for the extension; configured entries compare exactly
    pub fn size_limit(&self, extension: &str) -> Option<u64> {
        self.size_limits.as_ref()?.get(extension).copied()
    }

    /// Destination folder for a category label (case-sensitive)
    pub fn folder_for(&self, category: &str) -> Option<&str> {
        self.categories.as_ref()?.get(category).map(String::as_str)
    }
}
