use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "pythagoras.toml";

/// Fatal configuration problems. The server refuses to start on any of them.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("RESET_PASSWORD is not set; the ranking reset secret is required")]
    MissingResetSecret,
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("listen_host {0:?} is not an IP address")]
    InvalidListenHost(String),
    #[error("unknown store kind {0:?} (expected \"sqlite\" or \"file\")")]
    InvalidStoreKind(String),
    #[error("failed to parse {CONFIG_FILE}: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server-only credential that authorizes clearing the ranking.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ResetSecret(String);

impl ResetSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact comparison against a caller-supplied password. An unset secret
    /// matches nothing.
    pub fn matches(&self, provided: &str) -> bool {
        !self.0.is_empty() && self.0 == provided
    }
}

impl fmt::Debug for ResetSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetSecret([redacted])")
    }
}

/// Which persistence backend holds the ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Sqlite,
    File,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::File => "file",
        }
    }
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" | "json" => Ok(Self::File),
            _ => Err(ConfigError::InvalidStoreKind(s.to_string())),
        }
    }
}

/// Storage section of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub sqlite_path: PathBuf,
    pub file_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Sqlite,
            sqlite_path: PathBuf::from("data.db"),
            file_path: PathBuf::from("ranking.json"),
        }
    }
}

/// Top-level server configuration, loaded from `pythagoras.toml` and the
/// environment once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_host: String,
    pub port: u16,
    pub reset_password: ResetSecret,
    pub web_root: String,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            port: 3000,
            reset_password: ResetSecret::default(),
            web_root: "web".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load `pythagoras.toml` if it exists, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Some(content),
            Err(_) => {
                tracing::info!("No {CONFIG_FILE} found, using defaults");
                None
            },
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build a config from optional TOML text and an environment lookup.
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match toml_text {
            Some(content) => {
                let cfg = toml::from_str::<ServerConfig>(content)?;
                tracing::info!("Loaded configuration from {CONFIG_FILE}");
                if !cfg.reset_password.is_empty() {
                    tracing::warn!(
                        "reset_password is set in {CONFIG_FILE}; use the RESET_PASSWORD env var in production"
                    );
                }
                cfg
            },
            None => ServerConfig::default(),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        if let Some(host) = var("PYTHAGORAS_LISTEN_HOST") {
            self.listen_host = host;
        }
        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(secret) = var("RESET_PASSWORD") {
            self.reset_password = ResetSecret::new(secret);
        }
        if let Some(root) = var("PYTHAGORAS_WEB_ROOT") {
            self.web_root = root;
        }
        if let Some(kind) = var("PYTHAGORAS_STORE") {
            self.store.kind = kind.parse()?;
        }
        if let Some(path) = var("PYTHAGORAS_DB_PATH") {
            self.store.sqlite_path = PathBuf::from(path);
        }
        if let Some(path) = var("PYTHAGORAS_RANKING_FILE") {
            self.store.file_path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Check everything the server needs before it binds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reset_password.is_empty() {
            return Err(ConfigError::MissingResetSecret);
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .listen_host
            .parse()
            .map_err(|_| ConfigError::InvalidListenHost(self.listen_host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
