//! Gateway configuration
//!
//! Defaults follow the MediaWiki API conventions: 500 results per list request,
//! a 5 second `maxlag` threshold, and three attempts ten seconds apart when the
//! server answers 503. Every knob can be set from YAML or overridden from the
//! environment.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// What to do with `<warnings>` in an otherwise successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WarningPolicy {
    /// Promote the warning to an API error with code `warning`.
    #[default]
    #[serde(rename = "raise")]
    Raise,
    /// Log the warning and carry on.
    #[serde(rename = "log")]
    LogAndContinue,
}

impl WarningPolicy {
    /// Apply the policy to a warning message.
    pub fn apply(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        match self {
            WarningPolicy::Raise => Err(Error::api("warning", message)),
            WarningPolicy::LogAndContinue => {
                warn!("{}", message);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Mark edits as bot edits (`bot=1`, `assert=bot`).
    pub bot: bool,
    /// Page size requested from list queries.
    pub limit: u32,
    /// Upper bound on total search results.
    pub max_results: u32,
    /// Server replication lag threshold in seconds.
    pub maxlag: u32,
    /// Total attempts for a request answered with 503 (first try included).
    pub retry_count: u32,
    /// Pause between 503 attempts, in milliseconds.
    pub retry_delay_ms: u64,
    pub warnings: WarningPolicy,
    /// HTTP timeout per attempt, in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bot: false,
            limit: 500,
            max_results: 500,
            maxlag: 5,
            retry_count: 3,
            retry_delay_ms: 10_000,
            warnings: WarningPolicy::Raise,
            timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: GatewayConfig = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                e.to_string(),
                ErrorContext::new().with_source("gateway_config"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(format!("file: {}", path.display())),
            },
            other => other,
        })
    }

    /// Apply `MW_GATEWAY_*` environment overrides. Unparsable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any `MW_GATEWAY_*` style lookup.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let parsed_u32 = |key: &str| parsed(key).and_then(|v| u32::try_from(v).ok());

        if let Some(v) = parsed_u32("MW_GATEWAY_MAXLAG") {
            self.maxlag = v;
        }
        if let Some(v) = parsed_u32("MW_GATEWAY_RETRY_COUNT") {
            self.retry_count = v;
        }
        if let Some(v) = parsed("MW_GATEWAY_RETRY_DELAY_MS") {
            self.retry_delay_ms = v;
        }
        if let Some(v) = parsed("MW_GATEWAY_TIMEOUT_MS") {
            self.timeout_ms = v;
        }
        if let Some(v) = parsed_u32("MW_GATEWAY_LIMIT") {
            self.limit = v;
        }
        if lookup("MW_GATEWAY_IGNORE_WARNINGS").as_deref().map(str::trim) == Some("1") {
            self.warnings = WarningPolicy::LogAndContinue;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry_count == 0 {
            return Err(Error::configuration_with_context(
                "retry_count must allow at least one attempt",
                ErrorContext::new()
                    .with_field_path("retry_count")
                    .with_source("gateway_config"),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be positive",
                ErrorContext::new()
                    .with_field_path("timeout_ms")
                    .with_source("gateway_config"),
            ));
        }
        if self.limit == 0 {
            return Err(Error::configuration_with_context(
                "limit must be positive",
                ErrorContext::new()
                    .with_field_path("limit")
                    .with_source("gateway_config"),
            ));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("mediawiki-gateway/{}", env!("CARGO_PKG_VERSION")))
    }
}
