use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::PlaygroundConfig;
use crate::errors::{PlaygroundError, Result};
use crate::fetcher;
use crate::types::{decode_response, CompileResult};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// HTTP client for the playground fetch and compile endpoints
///
/// Each call performs exactly one request and owns its response; the client
/// holds no per-call state and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct Playground {
    client: Client,
    config: PlaygroundConfig,
}

impl Playground {
    pub fn new(config: PlaygroundConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(PlaygroundError::RequestConstruction)?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(PlaygroundConfig::from_env()?)
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    /// Download `link` and return the snippet embedded in it.
    pub async fn fetch(&self, link: &str) -> Result<String> {
        let html = fetcher::fetch_page(&self.client, link).await?;
        fetcher::extract_code(&html, &self.config.code_selector)
    }

    /// Submit `code` to the compile endpoint and aggregate the events it
    /// returns.
    ///
    /// A program that fails to build comes back as `Ok` with
    /// [`CompileResult::errors`] set.
    pub async fn compile(&self, code: &str) -> Result<CompileResult> {
        let form = [
            ("version", self.config.protocol_version.as_str()),
            ("body", code),
        ];

        let request = self
            .client
            .post(&self.config.compile_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .form(&form)
            .build()
            .map_err(PlaygroundError::RequestConstruction)?;

        log::debug!(
            "Submitting {} bytes of code to {}",
            code.len(),
            self.config.compile_url
        );

        let response = self
            .client
            .execute(request)
            .await
            .map_err(PlaygroundError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Compile endpoint returned status {}", status);
        }

        let body = response
            .bytes()
            .await
            .map_err(PlaygroundError::ResourceCleanup)?;

        let playground_response = decode_response(&body)?;
        log::debug!(
            "Compile response: errors={} events={}",
            !playground_response.errors.is_empty(),
            playground_response.events.as_ref().map_or(0, Vec::len)
        );

        Ok(playground_response.aggregate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_with_defaults() {
        let playground = Playground::new(PlaygroundConfig::default()).unwrap();
        assert_eq!(
            playground.config().compile_url,
            "https://play.golang.org/compile"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PlaygroundConfig::new().with_compile_url("not a url");
        let err = Playground::new(config).unwrap_err();
        assert!(matches!(err, PlaygroundError::Config(_)));
    }

    #[test]
    fn test_new_with_timeout() {
        let config = PlaygroundConfig::new().with_timeout(Duration::from_secs(3));
        let playground = Playground::new(config).unwrap();
        assert_eq!(playground.config().timeout, Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_compile_unparsable_endpoint_is_request_construction_error() {
        let config = PlaygroundConfig::new().with_compile_url("http://[::1");
        let playground = Playground {
            client: Client::new(),
            config,
        };
        let err = playground.compile("package main").await.unwrap_err();
        assert!(matches!(err, PlaygroundError::RequestConstruction(_)));
    }
}
