use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const ENV_BASE_URL: &str = "VIDAVOX_API_BASE_URL";
pub const ENV_API_KEY: &str = "VIDAVOX_API_KEY";
pub const ENV_TIMEOUT: &str = "VIDAVOX_API_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "RAG_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "RAG_LOG_FILE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{var} must be {expected}, got '{value}'")]
    InvalidEnv {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("base_url is required")]
    MissingBaseUrl,

    #[error("api_key is required (set VIDAVOX_API_KEY)")]
    MissingApiKey,

    #[error("api_key may only contain visible ASCII characters")]
    InvalidApiKey,

    #[error("timeout_secs must be positive")]
    InvalidTimeout,
}

/// Settings for talking to the document service.
///
/// Built once at startup (defaults, then an optional JSON file, then the
/// environment, then command-line flags) and handed to the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Default tracing filter directive for the binary
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// When set, logs are also written as JSON to this file
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlay values taken from an environment snapshot.
    ///
    /// The caller passes the variables in (normally `std::env::vars()`), so
    /// nothing below the binary reads the process environment.
    pub fn apply_env<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        if let Some(url) = vars.get(ENV_BASE_URL) {
            self.base_url = url.clone();
        }
        if let Some(key) = vars.get(ENV_API_KEY) {
            self.api_key = key.clone();
        }
        if let Some(timeout) = vars.get(ENV_TIMEOUT) {
            self.timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT,
                expected: "a whole number of seconds",
                value: timeout.clone(),
            })?;
        }
        if let Some(level) = vars.get(ENV_LOG_LEVEL) {
            self.log_level = level.to_lowercase();
        }
        if let Some(file) = vars.get(ENV_LOG_FILE) {
            self.log_file = (!file.is_empty()).then(|| file.clone());
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.normalized_base_url().trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        // Sent verbatim as a header value
        if !self.api_key.chars().all(|c| c == '\t' || (' '..='~').contains(&c)) {
            return Err(ConfigError::InvalidApiKey);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Copy that is safe to log
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api_key.is_empty() {
            copy.api_key = "***".to_string();
        }
        copy
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}
