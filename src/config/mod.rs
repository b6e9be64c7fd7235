//! Configuration system (layered: code > env > config file > defaults).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ReckonError;
use crate::tools::search::DEFAULT_SEARCH_URL;

/// Config file read from the working directory when `RECKON_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "reckon.toml";

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 10000;

/// Layered configuration for Reckon.
///
/// Resolution order, highest first:
/// 1. Explicit `with_*` setters
/// 2. Environment variables (a `.env` file is loaded first when present)
/// 3. The TOML file named by `RECKON_CONFIG`, or `reckon.toml`
/// 4. Built-in defaults
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReckonConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    model: String,
    temperature: f64,
    host: String,
    port: u16,
    max_steps: usize,
    model_timeout_secs: u64,
    tool_timeout_secs: u64,
    search_results: usize,
    search_url: String,
    stream_delay_ms: u64,
    session_dir: Option<PathBuf>,
}

impl fmt::Debug for ReckonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReckonConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_steps", &self.max_steps)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("search_results", &self.search_results)
            .field("search_url", &self.search_url)
            .field("stream_delay_ms", &self.stream_delay_ms)
            .field("session_dir", &self.session_dir)
            .finish()
    }
}

impl Default for ReckonConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_steps: 10,
            model_timeout_secs: 60,
            tool_timeout_secs: 30,
            search_results: 10,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            stream_delay_ms: 100,
            session_dir: None,
        }
    }
}

impl ReckonConfig {
    /// Load every layer below explicit setters.
    pub fn load() -> Result<Self, ReckonError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let path = std::env::var_os("RECKON_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let base = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_from(|key| std::env::var(key).ok())
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ReckonError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| ReckonError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ReckonError> {
        let config: Self = toml::from_str(content).map_err(|e| ReckonError::Configuration(e.to_string()))?;
        config.validated()
    }

    /// Overlay values from an environment lookup.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, ReckonError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL").or_else(|| var("PROXY_URLS")) {
            self.base_url = Some(url);
        }
        if let Some(model) = var("RECKON_MODEL") {
            self.model = model;
        }
        if let Some(host) = var("RECKON_HOST") {
            self.host = host;
        }
        if let Some(url) = var("RECKON_SEARCH_URL") {
            self.search_url = url;
        }
        if let Some(dir) = var("RECKON_SESSION_DIR") {
            self.session_dir = Some(PathBuf::from(dir));
        }
        if let Some(v) = var("RECKON_TEMPERATURE") {
            self.temperature = parse_env("RECKON_TEMPERATURE", &v)?;
        }
        if let Some(v) = var("RECKON_PORT") {
            self.port = parse_env("RECKON_PORT", &v)?;
        }
        if let Some(v) = var("RECKON_MAX_STEPS") {
            self.max_steps = parse_env("RECKON_MAX_STEPS", &v)?;
        }
        if let Some(v) = var("RECKON_MODEL_TIMEOUT_SECS") {
            self.model_timeout_secs = parse_env("RECKON_MODEL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("RECKON_TOOL_TIMEOUT_SECS") {
            self.tool_timeout_secs = parse_env("RECKON_TOOL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("RECKON_SEARCH_RESULTS") {
            self.search_results = parse_env("RECKON_SEARCH_RESULTS", &v)?;
        }
        if let Some(v) = var("RECKON_STREAM_DELAY_MS") {
            self.stream_delay_ms = parse_env("RECKON_STREAM_DELAY_MS", &v)?;
        }
        self.validated()
    }

    /// Reject limits that would stop every request before it starts.
    fn validated(self) -> Result<Self, ReckonError> {
        let limits = [
            ("max_steps", self.max_steps as u64),
            ("model_timeout_secs", self.model_timeout_secs),
            ("tool_timeout_secs", self.tool_timeout_secs),
            ("search_results", self.search_results as u64),
        ];
        for (key, value) in limits {
            if value == 0 {
                return Err(ReckonError::Configuration(format!("{key} must be at least 1")));
            }
        }
        Ok(self)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Result<Self, ReckonError> {
        self.max_steps = max_steps;
        self.validated()
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn search_results(&self) -> usize {
        self.search_results
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn stream_delay(&self) -> Duration {
        Duration::from_millis(self.stream_delay_ms)
    }

    pub fn session_dir(&self) -> Option<&Path> {
        self.session_dir.as_deref()
    }

    /// Public URL advertised in the agent card.
    pub fn public_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ReckonError> {
    value
        .trim()
        .parse()
        .map_err(|_| ReckonError::Configuration(format!("{key} has invalid value {value:?}")))
}
