use crate::config::GatewayConfig;
use crate::protocol::{Document, Element, ResponseParser};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::collections::BTreeMap;

use super::policy::RetryPolicy;

/// Client gateway to one wiki's API.
///
/// Owns the session (cookies, login credentials) exclusively. Calls are
/// blocking and take `&mut self`; share a gateway across threads only behind
/// your own lock.
pub struct Gateway<T: Transport = HttpTransport> {
    pub(crate) transport: T,
    pub(crate) session: Session,
    pub(crate) config: GatewayConfig,
    pub(crate) parser: ResponseParser,
    pub(crate) policy: RetryPolicy,
}

/// Result of one engine call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub document: Document,
    /// Value extracted from `query-continue`, `None` when there is nothing more.
    pub continuation: Option<String>,
}

impl ApiResponse {
    pub fn root(&self) -> &Element {
        self.document.root()
    }
}

impl Gateway<HttpTransport> {
    /// Gateway with default configuration for the given `api.php` URL.
    pub fn new(url: &str) -> Result<Self> {
        super::GatewayBuilder::new(url).build()
    }
}

impl<T: Transport> Gateway<T> {
    pub(crate) fn from_parts(transport: T, session: Session, config: GatewayConfig) -> Self {
        let parser = ResponseParser::new(config.warnings);
        let policy = RetryPolicy::from_config(&config);
        Self {
            transport,
            session,
            config,
            parser,
            policy,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        self.session.cookies()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `false` for missing pages; `invalid` pages go through the warning
    /// policy and count as missing when the policy lets them pass.
    pub(crate) fn valid_page(&self, page: Option<&Element>) -> Result<bool> {
        let Some(page) = page else {
            return Ok(false);
        };
        if page.has_attr("missing") {
            return Ok(false);
        }
        if page.has_attr("invalid") {
            self.config.warnings.apply(format!(
                "Invalid title '{}'",
                page.attr("title").unwrap_or_default()
            ))?;
            return Ok(false);
        }
        Ok(true)
    }
}
