//! Protocol error types

/// Failures to understand a response at the protocol level.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Response is not XML: {reason}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    NotXml {
        reason: String,
        hint: Option<String>,
    },

    #[error("Response does not contain MediaWiki API XML: root element <{root}>{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    UnrecognizedRoot { root: String, hint: Option<String> },

    #[error("Bad response: HTTP {status}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    BadStatus {
        status: u16,
        body: String,
        hint: Option<String>,
    },

    #[error("Missing <{path}> in '{action}' response")]
    MissingElement { action: String, path: String },
}

impl ProtocolError {
    /// Attach an actionable hint to the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint_val = Some(hint.into());
        match self {
            ProtocolError::NotXml { ref mut hint, .. } => *hint = hint_val,
            ProtocolError::UnrecognizedRoot { ref mut hint, .. } => *hint = hint_val,
            ProtocolError::BadStatus { ref mut hint, .. } => *hint = hint_val,
            ProtocolError::MissingElement { .. } => (),
        }
        self
    }

    pub(crate) fn missing(action: impl Into<String>, path: impl Into<String>) -> Self {
        ProtocolError::MissingElement {
            action: action.into(),
            path: path.into(),
        }
    }
}
