//! API response validation

use super::{Document, Element, ProtocolError};
use crate::config::WarningPolicy;
use crate::{Error, Result};
use tracing::debug;

/// Root element names of a recognized API response.
pub const API_ROOTS: [&str; 2] = ["api", "mediawiki"];

const NOT_API_HINT: &str = "Are you sure you are pointing to api.php?";

/// Validates raw responses and classifies server-reported errors and warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    warnings: WarningPolicy,
}

impl ResponseParser {
    pub fn new(warnings: WarningPolicy) -> Self {
        Self { warnings }
    }

    pub fn warning_policy(&self) -> WarningPolicy {
        self.warnings
    }

    /// Parse a response body.
    ///
    /// An `<error>` element always wins: it is raised as [`Error::Api`] with
    /// the element's `code`/`info`. `<warnings>` are handed to the warning
    /// policy, which either logs them or raises an API error with code
    /// `warning`.
    pub fn parse(&self, body: &[u8]) -> Result<Document> {
        let document = Document::parse(body).map_err(|e| e.with_hint(NOT_API_HINT))?;
        let root = document.root();

        if !API_ROOTS.contains(&root.name()) {
            return Err(ProtocolError::UnrecognizedRoot {
                root: root.name().to_string(),
                hint: None,
            }
            .with_hint(NOT_API_HINT)
            .into());
        }

        if let Some(error) = root.child("error") {
            let code = error.attr("code").unwrap_or_default();
            let info = error.attr("info").unwrap_or_default();
            debug!(code, info, "API reported an error");
            return Err(Error::api(code, info));
        }

        if let Some(warnings) = root.child("warnings") {
            self.warnings
                .apply(format!("API warning: {}", warning_text(warnings)))?;
        }

        Ok(document)
    }
}

fn warning_text(warnings: &Element) -> String {
    warnings
        .elements()
        .map(|e| e.text().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ")
}
