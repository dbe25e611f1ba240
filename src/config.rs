// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::{fs::File, io::BufReader, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

pub const API_KEY_ENV: &str = "BROWSERLESS_API_KEY";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_ENDPOINT: &str = "https://chrome.browserless.io/pdf";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub navigation_timeout_secs: u64,
    pub settle_delay_ms: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid url"),
            api_key: None,
            request_timeout_secs: 60,
            navigation_timeout_secs: 45,
            settle_delay_ms: 1500,
        }
    }
}

// Manual impl so the key never ends up in logs
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .finish()
    }
}

/// How per-URL renders of a single job are dispatched against the backend.
///
/// `max_concurrency = 1` renders strictly one URL after the other. The
/// interval spaces out dispatch starts, for backends with a request rate limit.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_concurrency: usize,
    pub request_interval_ms: u64,
}

impl PipelineConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            request_interval_ms: 0,
        }
    }
}

impl Config {
    pub fn read(path: &str) -> anyhow::Result<Self> {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open config file {}: {}", path, e))?;
        let reader = BufReader::new(file);
        let config: Config = serde_yaml::from_reader(reader)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path, e))?;
        info!("Loaded config file={}", path);
        config.postprocess(|name| std::env::var(name).ok())
    }

    /// Reads the given file, or starts from defaults, then applies environment overrides.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => Self::empty().postprocess(|name| std::env::var(name).ok()),
        }
    }

    fn postprocess<F>(mut self, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = env(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("Using api key from {}", API_KEY_ENV);
            self.backend.api_key = Some(key.trim().to_string());
        }
        if let Some(port) = env(PORT_ENV).filter(|p| !p.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {} value {:?}: {}", PORT_ENV, port, e))?;
        }
        if self.pipeline.max_concurrency == 0 {
            self.pipeline.max_concurrency = 1;
        }
        if self.backend.api_key.as_deref().is_some_and(|k| k.is_empty()) {
            self.backend.api_key = None;
        }
        Ok(self)
    }

    pub fn empty() -> Self {
        Self {
            debug: false,
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}
