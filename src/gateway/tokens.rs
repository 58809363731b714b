//! Token Manager
//!
//! Every mutating action needs a server-issued token fetched fresh for the
//! exact title/action pair. A missing token attribute means the logged-in
//! identity lacks the right, and surfaces as [`Error::Unauthorized`].

use crate::params::RequestParams;
use crate::protocol::{DocPath, ProtocolError};
use crate::transport::Transport;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

use super::core::Gateway;

/// Action-scoped token kinds obtainable through `prop=info&intoken=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Edit,
    Delete,
    Move,
    Protect,
    Import,
    Email,
}

impl TokenKind {
    pub const ALL: [TokenKind; 6] = [
        TokenKind::Edit,
        TokenKind::Delete,
        TokenKind::Move,
        TokenKind::Protect,
        TokenKind::Import,
        TokenKind::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Edit => "edit",
            TokenKind::Delete => "delete",
            TokenKind::Move => "move",
            TokenKind::Protect => "protect",
            TokenKind::Import => "import",
            TokenKind::Email => "email",
        }
    }

    /// Attribute carrying the token on the page element, e.g. `edittoken`.
    fn attribute(&self) -> String {
        format!("{}token", self.as_str())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TokenKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                Error::validation_with_context(
                    format!("unknown token kind '{}'", s),
                    crate::ErrorContext::new().with_field_path("intoken"),
                )
            })
    }
}

impl<T: Transport> Gateway<T> {
    /// Fetch an action token for `titles` (one title, or several joined with `|`).
    pub fn token(&mut self, kind: TokenKind, titles: &str) -> Result<String> {
        let response = self.execute(
            RequestParams::query()
                .with("prop", "info")
                .with("intoken", kind.as_str())
                .with("titles", titles),
            None,
        )?;
        let page = response
            .root()
            .find("query/pages/page")
            .ok_or_else(|| ProtocolError::missing("query", "query/pages/page"))?;

        page.attr(&kind.attribute())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::unauthorized(format!(
                    "User is not permitted to perform this operation: {}",
                    kind
                ))
            })
    }

    /// Token for undeleting `titles`.
    ///
    /// `Ok(None)` when the page has no deleted revisions: there is nothing to
    /// undelete, which is not an error.
    pub fn undelete_token(&mut self, titles: &str) -> Result<Option<String>> {
        let response = self.execute(
            RequestParams::query()
                .with("list", "deletedrevs")
                .with("prop", "info")
                .with("drprop", "token")
                .with("titles", titles),
            None,
        )?;
        let Some(page) = response.root().find("query/deletedrevs/page") else {
            return Ok(None);
        };
        match page.attr("token") {
            Some(token) => Ok(Some(token.to_string())),
            None => Err(Error::unauthorized(
                "User is not permitted to perform this operation: undelete",
            )),
        }
    }

    /// Token for changing `user`'s group membership.
    pub fn user_rights_token(&mut self, user: &str) -> Result<String> {
        let response = self.execute(
            RequestParams::query()
                .with("list", "users")
                .with("ustoken", "userrights")
                .with("ususers", user),
            None,
        )?;
        let element = response
            .root()
            .find("query/users/user")
            .ok_or_else(|| ProtocolError::missing("query", "query/users/user"))?;

        if let Some(token) = element.attr("userrightstoken") {
            return Ok(token.to_string());
        }
        if element.has_attr("missing") {
            return Err(Error::api(
                "invaliduser",
                format!("User '{}' was not found", user),
            ));
        }
        Err(Error::unauthorized(format!(
            "User '{}' is not permitted to perform this operation: userrights",
            self.session.username().unwrap_or("anonymous")
        )))
    }

    /// Token for `action=options`.
    pub fn options_token(&mut self) -> Result<String> {
        let response = self.execute(
            RequestParams::action("tokens").with("type", "options"),
            None,
        )?;
        let path = DocPath::relative()
            .child("tokens")
            .attribute("optionstoken");
        path.first_value(response.root()).ok_or_else(|| {
            Error::unauthorized("User is not permitted to perform this operation: options")
        })
    }
}
