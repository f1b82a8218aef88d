//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/wikiseek.sqlite"
//!
//! [ingest]
//! log_path = "./data/search.log"
//! languages = ["da", "en"]
//!
//! [search_engine]
//! host = "localhost"
//! username = "elastic"
//! ```
//!
//! Every section except `[db]` is optional. When `search_engine.password`
//! is not set, the `ES_PASSWORD` environment variable is used.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub search_engine: SearchEngineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// Languages tried per term, highest priority first.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_source_domain")]
    pub source_domain: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            languages: default_languages(),
            source_domain: default_source_domain(),
        }
    }
}

fn default_log_path() -> PathBuf {
    PathBuf::from("search.log")
}
fn default_languages() -> Vec<String> {
    vec!["da".to_string(), "en".to_string()]
}
fn default_source_domain() -> String {
    "wikipedia.org".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("wikiseek/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchEngineConfig {
    #[serde(default = "default_es_host")]
    pub host: String,
    #[serde(default = "default_es_port")]
    pub port: u16,
    #[serde(default = "default_es_username")]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_es_index")]
    pub index: String,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_es_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            host: default_es_host(),
            port: default_es_port(),
            username: default_es_username(),
            password: None,
            index: default_es_index(),
            connect_retries: default_connect_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            timeout_secs: default_es_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

fn default_es_host() -> String {
    "localhost".to_string()
}
fn default_es_port() -> u16 {
    9200
}
fn default_es_username() -> String {
    "elastic".to_string()
}
fn default_es_index() -> String {
    "pages".to_string()
}
fn default_connect_retries() -> u32 {
    10
}
fn default_retry_delay_secs() -> u64 {
    5
}
fn default_es_timeout_secs() -> u64 {
    10
}

impl SearchEngineConfig {
    /// Configured password, else `ES_PASSWORD`, else `"changeme"`.
    pub fn resolved_password(&self) -> String {
        self.password
            .clone()
            .or_else(|| std::env::var("ES_PASSWORD").ok())
            .unwrap_or_else(|| "changeme".to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_max_results() -> usize {
    10
}
fn default_snippet_chars() -> usize {
    240
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.ingest.languages.is_empty() {
        anyhow::bail!("ingest.languages must list at least one language");
    }
    if let Some(bad) = config
        .ingest
        .languages
        .iter()
        .find(|l| l.is_empty() || !l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
    {
        anyhow::bail!("ingest.languages contains an invalid language code: '{}'", bad);
    }
    if config.ingest.source_domain.trim().is_empty() {
        anyhow::bail!("ingest.source_domain must not be empty");
    }
    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }
    if config.search_engine.connect_retries == 0 {
        anyhow::bail!("search_engine.connect_retries must be >= 1");
    }
    if config.search.max_results == 0 {
        anyhow::bail!("search.max_results must be >= 1");
    }
    if config.search.snippet_chars == 0 {
        anyhow::bail!("search.snippet_chars must be >= 1");
    }

    Ok(config)
}
