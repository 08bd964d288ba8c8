//! Configuration types for nutshell.
//!
//! [`Config::load`] layers, lowest first: the embedded defaults, the config
//! file (`~/.config/nutshell/config.toml` or an explicit path), and
//! `NUTSHELL__SECTION__KEY` environment variables. [`Config::defaults`]
//! returns the embedded defaults without touching the filesystem or the
//! environment (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 5000

[store]
backend  = "memory"
url      = "http://localhost:5984"
database = "nutshell"
username = ""
password = ""
seed     = ""

[pages]
entries_per_page = 30
"#;

const ENV_PREFIX: &str = "NUTSHELL";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub pages: PagesConfig,
}

/// `[server]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which document store backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    CouchDb,
}

/// `[store]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    /// Base URL of the CouchDB server.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// CouchDB basic-auth credentials. Empty means anonymous.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Fixture file loaded into the store at startup. Empty means none.
    #[serde(default)]
    pub seed: String,
}

fn default_backend() -> Backend { Backend::Memory }
fn default_url() -> String { "http://localhost:5984".to_string() }
fn default_database() -> String { "nutshell".to_string() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_url(),
            database: default_database(),
            username: String::new(),
            password: String::new(),
            seed: String::new(),
        }
    }
}

impl StoreConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }

    pub fn seed_path(&self) -> Option<&Path> {
        if self.seed.is_empty() {
            None
        } else {
            Some(Path::new(&self.seed))
        }
    }
}

/// `[pages]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesConfig {
    #[serde(default = "default_entries_per_page")]
    pub entries_per_page: usize,
}

fn default_entries_per_page() -> usize { crate::query::DEFAULT_PAGE_SIZE }

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            entries_per_page: default_entries_per_page(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load configuration. `path` overrides the default file location; the
    /// default file may be absent, an explicit one may not.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::from(config_path().as_path()).required(false),
        };

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("nutshell")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
