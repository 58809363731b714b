use super::core::Gateway;
use crate::config::{GatewayConfig, WarningPolicy};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};
use std::time::Duration;
use url::Url;

/// Builder for gateways with custom configuration.
///
/// Keep this surface area small and predictable: each setter mirrors one
/// [`GatewayConfig`] field.
pub struct GatewayBuilder {
    url: String,
    config: GatewayConfig,
}

impl GatewayBuilder {
    /// `url` is the full path of the wiki's `api.php`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            config: GatewayConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Mark edits as bot edits.
    pub fn bot(mut self, enable: bool) -> Self {
        self.config.bot = enable;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.config.limit = limit;
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.config.max_results = max_results;
        self
    }

    pub fn maxlag(mut self, seconds: u32) -> Self {
        self.config.maxlag = seconds;
        self
    }

    /// Total attempts for a request answered with 503.
    pub fn retry_count(mut self, attempts: u32) -> Self {
        self.config.retry_count = attempts;
        self
    }

    /// Pause between 503 attempts. Kept at millisecond precision.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay_ms = duration_ms(delay);
        self
    }

    pub fn warnings(mut self, policy: WarningPolicy) -> Self {
        self.config.warnings = policy;
        self
    }

    /// Shorthand for `warnings(WarningPolicy::LogAndContinue)`.
    pub fn ignore_warnings(self, ignore: bool) -> Self {
        self.warnings(if ignore {
            WarningPolicy::LogAndContinue
        } else {
            WarningPolicy::Raise
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = duration_ms(timeout).max(1);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Build a gateway over the default HTTP transport.
    pub fn build(self) -> Result<Gateway<HttpTransport>> {
        let transport = HttpTransport::new(&self.config)?;
        self.build_with_transport(transport)
    }

    /// Build a gateway over a caller-supplied transport.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Gateway<T>> {
        self.config.validate()?;
        let url = Url::parse(&self.url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid API URL: {}", e),
                ErrorContext::new()
                    .with_field_path("url")
                    .with_details(self.url.clone())
                    .with_source("gateway_builder"),
            )
        })?;
        Ok(Gateway::from_parts(transport, Session::new(url), self.config))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
