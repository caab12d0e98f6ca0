use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{MarkError, MarkResult};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub allow_export: bool,
    pub allow_import: bool,
    /// Seed starter bookmarks into an empty store on startup
    pub prefill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API used by `list`, `search` and `open`
    pub server_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db").join("db.sqlite"),
            allow_export: true,
            allow_import: true,
            prefill: false,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("puremark")
            .join("config.toml")
    }

    /// Load config from file (defaults if missing or unreadable), then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = Self::config_path();

        let mut config = if path.exists() {
            match fs::read_to_string(&path)
                .map_err(MarkError::from)
                .and_then(|content| Self::parse(&content))
            {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate();
        config
    }

    pub fn parse(content: &str) -> MarkResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override values from environment variables. `lookup` returns the
    /// value of a variable if it is set.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        // Import/export stay on unless explicitly "false"; prefill needs "true".
        if let Some(v) = lookup("DB_ALLOW_EXPORT") {
            self.database.allow_export = v != "false";
        }
        if let Some(v) = lookup("DB_ALLOW_IMPORT") {
            self.database.allow_import = v != "false";
        }
        if let Some(v) = lookup("DB_PREFILL") {
            self.database.prefill = v == "true";
        }
        if let Some(url) = lookup("PUREMARK_SERVER") {
            self.client.server_url = url;
        }
    }

    /// Fix up values that would make the server unusable. Run again after
    /// anything else overrides the config.
    pub fn validate(&mut self) {
        if self.server.host.trim().is_empty() {
            self.server.host = DEFAULT_HOST.to_string();
        }

        // Port 0 would bind a random port the client cannot know about
        if self.server.port == 0 {
            self.server.port = DEFAULT_PORT;
        }

        if self.database.path.as_os_str().is_empty() {
            self.database.path = DatabaseConfig::default().path;
        }

        let trimmed = self.client.server_url.trim().trim_end_matches('/');
        self.client.server_url = if trimmed.is_empty() {
            ClientConfig::default().server_url
        } else {
            trimmed.to_string()
        };
    }
}
