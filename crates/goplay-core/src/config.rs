//! Endpoint and scraping configuration
//!
//! The defaults target the public Go playground and reproduce its fixed
//! protocol. Overrides exist so the client can be pointed at a mirror or a
//! local test server without code changes.

use crate::errors::{PlaygroundError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_COMPILE_URL: &str = "https://play.golang.org/compile";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2";
pub const DEFAULT_CODE_SELECTOR: &str = "#code";

pub const ENV_COMPILE_URL: &str = "GOPLAY_COMPILE_URL";
pub const ENV_PROTOCOL_VERSION: &str = "GOPLAY_PROTOCOL_VERSION";
pub const ENV_CODE_SELECTOR: &str = "GOPLAY_CODE_SELECTOR";
pub const ENV_TIMEOUT_SECS: &str = "GOPLAY_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "GOPLAY_USER_AGENT";

#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    pub compile_url: String,
    pub protocol_version: String,
    pub code_selector: String,
    /// Deadline applied to the HTTP client. `None` leaves latency unbounded.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            compile_url: DEFAULT_COMPILE_URL.to_string(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            code_selector: DEFAULT_CODE_SELECTOR.to_string(),
            timeout: None,
            user_agent: format!("goplay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PlaygroundConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from defaults and apply any `GOPLAY_*` overrides present in the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var(ENV_COMPILE_URL) {
            config.compile_url = url;
        }
        if let Ok(version) = env::var(ENV_PROTOCOL_VERSION) {
            config.protocol_version = version;
        }
        if let Ok(selector) = env::var(ENV_CODE_SELECTOR) {
            config.code_selector = selector;
        }
        if let Ok(user_agent) = env::var(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                PlaygroundError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        log::debug!("Loaded playground config from environment: {:?}", config);
        Ok(config)
    }

    pub fn with_compile_url(mut self, url: impl Into<String>) -> Self {
        self.compile_url = url.into();
        self
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    pub fn with_code_selector(mut self, selector: impl Into<String>) -> Self {
        self.code_selector = selector.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.compile_url.trim();
        if url.is_empty() {
            return Err(PlaygroundError::Config(
                "compile_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PlaygroundError::Config(format!(
                "compile_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.protocol_version.trim().is_empty() {
            return Err(PlaygroundError::Config(
                "protocol_version must not be empty".to_string(),
            ));
        }
        scraper::Selector::parse(&self.code_selector).map_err(|e| {
            PlaygroundError::Config(format!(
                "invalid code selector '{}': {:?}",
                self.code_selector, e
            ))
        })?;
        if self.timeout == Some(Duration::ZERO) {
            return Err(PlaygroundError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
