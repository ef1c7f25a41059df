//! A2A configuration
//!
//! Configuration for the protocol client and orchestrator, loaded from the
//! environment. All durations are given in seconds in the environment and
//! parsed into [`Duration`] values.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GatewayError, Result};

/// Configuration for the A2A protocol client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct A2aConfig {
    /// Configured agent URLs
    #[serde(default)]
    pub agent_urls: Vec<String>,

    /// HTTP client timeout per request
    #[serde(default = "default_client_timeout")]
    pub client_timeout: Duration,

    /// Additional card-fetch attempts during initialization
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay; doubles on each subsequent attempt
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff: Duration,

    /// Upper bound on the retry delay
    #[serde(default = "default_retry_interval")]
    pub retry_interval: Duration,

    /// Background reconnection of failed agents
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Background health polling and task polling
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Reconnection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Whether failed agents are retried in the background
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Interval between reconnection passes
    #[serde(default = "default_reconnect_interval")]
    pub interval: Duration,
}

/// Polling settings for agent health and task completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Whether background health polling is available
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Interval between health-polling ticks
    #[serde(default = "default_status_interval")]
    pub status_interval: Duration,

    /// Interval between `tasks/get` polls for a submitted task
    #[serde(default = "default_task_interval")]
    pub task_interval: Duration,

    /// Hard cap on `tasks/get` polls per task
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_client_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_secs(1)
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_reconnect_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_status_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_task_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_reconnect_interval(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            status_interval: default_status_interval(),
            task_interval: default_task_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Default for A2aConfig {
    fn default() -> Self {
        Self {
            agent_urls: Vec::new(),
            client_timeout: default_client_timeout(),
            max_retries: default_max_retries(),
            initial_backoff: default_initial_backoff(),
            retry_interval: default_retry_interval(),
            reconnect: ReconnectConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl A2aConfig {
    /// Create a configuration for the given agent URLs
    pub fn new(agent_urls: Vec<String>) -> Self {
        Self {
            agent_urls,
            ..Default::default()
        }
    }

    /// Set the HTTP client timeout
    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    /// Set the initialization retry budget
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial retry backoff
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the retry backoff cap
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Recognized variables: `A2A_AGENT_URLS` (comma separated),
    /// `A2A_CLIENT_TIMEOUT`, `A2A_MAX_RETRIES`, `A2A_INITIAL_BACKOFF`,
    /// `A2A_RETRY_INTERVAL`, `A2A_ENABLE_RECONNECT`, `A2A_RECONNECT_INTERVAL`,
    /// `A2A_ENABLE_STATUS_POLLING`, `A2A_STATUS_POLLING_INTERVAL`,
    /// `A2A_TASK_POLLING_INTERVAL`, `A2A_MAX_POLL_ATTEMPTS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        debug!("Loading A2A configuration from environment variables");

        let mut config = Self::default();

        if let Ok(urls) = env::var("A2A_AGENT_URLS") {
            config.agent_urls = urls
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(timeout) = env::var("A2A_CLIENT_TIMEOUT") {
            config.client_timeout = parse_secs("A2A_CLIENT_TIMEOUT", &timeout)?;
        }
        if let Ok(retries) = env::var("A2A_MAX_RETRIES") {
            config.max_retries = retries
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid max retries: {}", e)))?;
        }
        if let Ok(backoff) = env::var("A2A_INITIAL_BACKOFF") {
            config.initial_backoff = parse_secs("A2A_INITIAL_BACKOFF", &backoff)?;
        }
        if let Ok(interval) = env::var("A2A_RETRY_INTERVAL") {
            config.retry_interval = parse_secs("A2A_RETRY_INTERVAL", &interval)?;
        }
        if let Ok(enabled) = env::var("A2A_ENABLE_RECONNECT") {
            config.reconnect.enabled = parse_bool("A2A_ENABLE_RECONNECT", &enabled)?;
        }
        if let Ok(interval) = env::var("A2A_RECONNECT_INTERVAL") {
            config.reconnect.interval = parse_secs("A2A_RECONNECT_INTERVAL", &interval)?;
        }
        if let Ok(enabled) = env::var("A2A_ENABLE_STATUS_POLLING") {
            config.polling.enabled = parse_bool("A2A_ENABLE_STATUS_POLLING", &enabled)?;
        }
        if let Ok(interval) = env::var("A2A_STATUS_POLLING_INTERVAL") {
            config.polling.status_interval = parse_secs("A2A_STATUS_POLLING_INTERVAL", &interval)?;
        }
        if let Ok(interval) = env::var("A2A_TASK_POLLING_INTERVAL") {
            config.polling.task_interval = parse_secs("A2A_TASK_POLLING_INTERVAL", &interval)?;
        }
        if let Ok(attempts) = env::var("A2A_MAX_POLL_ATTEMPTS") {
            config.polling.max_poll_attempts = attempts
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid max poll attempts: {}", e)))?;
        }

        config.validate()?;
        debug!(
            agents = config.agent_urls.len(),
            "A2A configuration loaded from environment"
        );
        Ok(config)
    }

    /// Validate the configured agent URLs
    pub fn validate(&self) -> Result<()> {
        for url in &self.agent_urls {
            url::Url::parse(url)
                .map_err(|e| GatewayError::Config(format!("Invalid agent URL '{}': {}", url, e)))?;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GatewayError::Config(format!(
                    "Agent URL must start with http:// or https://, got: {}",
                    url
                )));
            }
        }
        Ok(())
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| GatewayError::Config(format!("Invalid {}: {}", name, e)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(GatewayError::Config(format!(
            "Invalid {}: expected boolean, got '{}'",
            name, other
        ))),
    }
}
