use pharmasite_store::Role;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "pharmasite.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Pharmasite configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// JSON file holding every document; memory-only when absent
    #[serde(default = "default_data_file")]
    pub data_file: Option<String>,

    /// Where uploaded images land, served under `/uploads`
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Optional directory of public static files
    #[serde(default)]
    pub public_dir: Option<String>,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Upper bound on a single store write
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Reload the data file when it changes on disk
    #[serde(default = "default_true")]
    pub watch_data_file: bool,

    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// HMAC secret for session tokens; a random one is used when empty
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,

    /// Mark the cookie `Secure`
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    pub email: String,
    /// Argon2 PHC string, see `pharmasite hash-password`
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_ai_model")]
    pub model: String,

    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_data_file() -> Option<String> {
    Some("data/content.json".to_string())
}

fn default_uploads_dir() -> String {
    "public/uploads".to_string()
}

fn default_write_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> u64 {
    60 * 60 * 24 * 7
}

fn default_role() -> Role {
    Role::Editor
}

fn default_ai_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_timeout_ms() -> u64 {
    30_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: default_session_ttl(),
            secure_cookie: false,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_ai_model(),
            endpoint: default_ai_endpoint(),
            timeout_ms: default_ai_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            data_file: default_data_file(),
            uploads_dir: default_uploads_dir(),
            public_dir: None,
            session: SessionConfig::default(),
            accounts: Vec::new(),
            write_timeout_ms: default_write_timeout_ms(),
            watch_data_file: true,
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> ConfigResult<Self> {
        Self::load_from(&cwd.join(DEFAULT_CONFIG_NAME))
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `PHARMASITE_BIND`, `SESSION_SECRET`, `AI_API_KEY`, `AI_MODEL`.
    /// Admin credentials from the environment are read by the authenticator.
    pub fn with_env(mut self) -> ConfigResult<Self> {
        self.apply_vars(|name| std::env::var(name).ok())?;
        Ok(self)
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(bind) = var("PHARMASITE_BIND") {
            if !bind.contains(':') {
                return Err(ConfigError::Env {
                    name: "PHARMASITE_BIND",
                    value: bind,
                });
            }
            self.bind = bind;
        }
        if let Some(secret) = var("SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Some(key) = var("AI_API_KEY").filter(|k| !k.is_empty()) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = var("AI_MODEL") {
            self.ai.model = model;
        }
        Ok(())
    }

    /// Resolve a configured path against `cwd`
    pub fn resolve(&self, cwd: &Path, path: &str) -> PathBuf {
        cwd.join(path)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
