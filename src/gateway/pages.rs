//! Page operations: read, edit, delete, move, protect, upload, review.

use crate::params::RequestParams;
use crate::protocol::{Document, Element, ProtocolError};
use crate::transport::Transport;
use crate::{Error, ErrorContext, Result};
use std::path::{Path, PathBuf};

use super::core::Gateway;
use super::tokens::TokenKind;

const DEFAULT_UPLOAD_COMMENT: &str = "Uploaded by mediawiki-gateway";
const DEFAULT_REVIEW_COMMENT: &str = "Reviewed by mediawiki-gateway";
const SEMANTIC_MEDIAWIKI: &str = "Semantic MediaWiki";

/// Options for [`Gateway::create`] and [`Gateway::edit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOptions {
    /// Allow replacing an existing page. When false the edit is `createonly`.
    pub overwrite: bool,
    pub summary: Option<String>,
    /// Reuse a previously fetched edit token instead of requesting one.
    pub token: Option<String>,
    /// `Some(true)` marks the edit minor, `Some(false)` explicitly major.
    pub minor: Option<bool>,
    pub bot: bool,
    pub section: Option<String>,
}

/// Options for [`Gateway::move_page`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOptions {
    pub move_subpages: bool,
    pub move_talk: bool,
    /// Needs the `suppressredirect` right; the server ignores it otherwise.
    pub no_redirect: bool,
    pub reason: Option<String>,
    pub watch: bool,
    pub unwatch: bool,
}

/// One protection rule: who may perform `action` until `expiry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protection {
    pub action: String,
    pub group: String,
    /// Defaults to `never`.
    pub expiry: Option<String>,
}

impl Protection {
    pub fn new(action: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            group: group.into(),
            expiry: None,
        }
    }

    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectOptions {
    /// Protect pages transcluded into this one.
    pub cascade: bool,
    pub reason: Option<String>,
}

/// Where an upload's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Local file sent as multipart content.
    File(PathBuf),
    /// URL the server fetches itself.
    Url(String),
    /// Resume a stashed upload from the same login session.
    SessionKey(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Target file name; defaults to the last path segment of the source.
    pub filename: Option<String>,
    pub comment: Option<String>,
    /// Initial page text; the server falls back to `comment`.
    pub text: Option<String>,
    pub watch: bool,
    pub ignore_warnings: bool,
}

impl<T: Transport> Gateway<T> {
    /// Wikitext of the latest revision. `None` when the page does not exist.
    /// Redirects are not followed.
    pub fn get(&mut self, title: &str) -> Result<Option<String>> {
        let response = self.execute(
            RequestParams::query()
                .with("prop", "revisions")
                .with("rvprop", "content")
                .with("titles", title),
            None,
        )?;
        let page = response.root().find("query/pages/page");
        if !self.valid_page(page)? {
            return Ok(None);
        }
        let text = page
            .and_then(|p| p.find("revisions/rev"))
            .and_then(Element::text)
            .unwrap_or_default();
        Ok(Some(text))
    }

    /// Latest revision id. `None` when the page does not exist.
    pub fn revision(&mut self, title: &str) -> Result<Option<String>> {
        let response = self.execute(
            RequestParams::query()
                .with("prop", "revisions")
                .with("rvprop", "ids")
                .with("rvlimit", 1u32)
                .with("titles", title),
            None,
        )?;
        let page = response.root().find("query/pages/page");
        if !self.valid_page(page)? {
            return Ok(None);
        }
        Ok(page
            .and_then(|p| p.find("revisions/rev"))
            .and_then(|rev| rev.attr("revid"))
            .map(str::to_string))
    }

    /// `false` for ordinary pages and for pages that do not exist.
    pub fn is_redirect(&mut self, title: &str) -> Result<bool> {
        let response = self.execute(
            RequestParams::query()
                .with("prop", "info")
                .with("titles", title),
            None,
        )?;
        let page = response.root().find("query/pages/page");
        Ok(self.valid_page(page)? && page.is_some_and(|p| p.has_attr("redirect")))
    }

    /// Create a page. Fails with `articleexists` unless `options.overwrite`.
    pub fn create(&mut self, title: &str, content: &str, options: &EditOptions) -> Result<Document> {
        let token = match &options.token {
            Some(token) => token.clone(),
            None => self.token(TokenKind::Edit, title)?,
        };
        let bot = self.config.bot || options.bot;
        let params = RequestParams::action("edit")
            .with("title", title)
            .with("text", content)
            .with("summary", options.summary.as_deref().unwrap_or_default())
            .with("token", token)
            .with_opt("bot", bot.then_some("1"))
            .with_opt("assert", bot.then_some("bot"))
            .with_opt("minor", (options.minor == Some(true)).then_some("1"))
            .with_opt("notminor", (options.minor == Some(false)).then_some("1"))
            .with_flag("createonly", !options.overwrite)
            .with_opt("section", options.section.as_deref());
        Ok(self.execute(params, None)?.document)
    }

    /// Create or replace a page.
    pub fn edit(&mut self, title: &str, content: &str, options: &EditOptions) -> Result<Document> {
        let options = EditOptions {
            overwrite: true,
            ..options.clone()
        };
        self.create(title, content, &options)
    }

    pub fn delete(&mut self, title: &str, reason: Option<&str>) -> Result<Document> {
        let token = self.token(TokenKind::Delete, title)?;
        let params = RequestParams::action("delete")
            .with("title", title)
            .with("token", token)
            .with_opt("reason", reason);
        Ok(self.execute(params, None)?.document)
    }

    /// Restore every deleted revision of `title`. Returns how many were
    /// restored; 0 when there was nothing to restore.
    pub fn undelete(&mut self, title: &str) -> Result<u32> {
        let Some(token) = self.undelete_token(title)? else {
            return Ok(0);
        };
        let response = self.execute(
            RequestParams::action("undelete")
                .with("title", title)
                .with("token", token),
            None,
        )?;
        let revisions = response
            .root()
            .child("undelete")
            .and_then(|u| u.attr("revisions"))
            .ok_or_else(|| ProtocolError::missing("undelete", "undelete/@revisions"))?;
        revisions.parse().map_err(|_| {
            Error::from(ProtocolError::missing(
                "undelete",
                format!("undelete/@revisions ('{}')", revisions),
            ))
        })
    }

    pub fn move_page(&mut self, from: &str, to: &str, options: &MoveOptions) -> Result<Document> {
        let token = self.token(TokenKind::Move, from)?;
        let params = RequestParams::action("move")
            .with("from", from)
            .with("to", to)
            .with("token", token)
            .with_flag("movesubpages", options.move_subpages)
            .with_flag("movetalk", options.move_talk)
            .with_flag("noredirect", options.no_redirect)
            .with_flag("watch", options.watch)
            .with_flag("unwatch", options.unwatch)
            .with_opt("reason", options.reason.as_deref());
        Ok(self.execute(params, None)?.document)
    }

    /// Apply protections to a page. Every rule needs an action and a group;
    /// use group `all` to lift a protection.
    pub fn protect(
        &mut self,
        title: &str,
        protections: &[Protection],
        options: &ProtectOptions,
    ) -> Result<Document> {
        if protections.is_empty() {
            return Err(Error::validation_with_context(
                "at least one protection is required",
                ErrorContext::new()
                    .with_field_path("protections")
                    .with_source("protect"),
            ));
        }
        if let Some((i, p)) = protections
            .iter()
            .enumerate()
            .find(|(_, p)| p.action.is_empty() || p.group.is_empty())
        {
            let field = if p.action.is_empty() { "action" } else { "group" };
            return Err(Error::validation_with_context(
                format!("missing required option '{}' for protections", field),
                ErrorContext::new()
                    .with_field_path(format!("protections[{}].{}", i, field))
                    .with_source("protect"),
            ));
        }

        let rules = protections
            .iter()
            .map(|p| format!("{}={}", p.action, p.group))
            .collect::<Vec<_>>()
            .join("|");
        let expiry = protections
            .iter()
            .map(|p| p.expiry.as_deref().unwrap_or("never"))
            .collect::<Vec<_>>()
            .join("|");

        let token = self.token(TokenKind::Protect, title)?;
        let params = RequestParams::action("protect")
            .with("title", title)
            .with("token", token)
            .with("protections", rules)
            .with("expiry", expiry)
            .with_flag("cascade", options.cascade)
            .with_opt("reason", options.reason.as_deref());
        Ok(self.execute(params, None)?.document)
    }

    /// Send an email through the wiki. `true` when the server reports success.
    pub fn email_user(&mut self, user: &str, subject: &str, text: &str) -> Result<bool> {
        let token = self.token(TokenKind::Email, &format!("User:{}", user))?;
        let response = self.execute(
            RequestParams::action("emailuser")
                .with("target", user)
                .with("subject", subject)
                .with("text", text)
                .with("token", token),
            None,
        )?;
        Ok(response
            .root()
            .child("emailuser")
            .and_then(|e| e.attr("result"))
            == Some("Success"))
    }

    /// Upload a file, have the server fetch one, or finish a stashed upload.
    pub fn upload(&mut self, source: UploadSource, options: &UploadOptions) -> Result<Document> {
        let filename = match (&options.filename, &source) {
            (Some(name), _) => Some(name.clone()),
            (None, UploadSource::File(path)) => file_name(path),
            (None, UploadSource::Url(url)) => url
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            (None, UploadSource::SessionKey(_)) => None,
        };
        let Some(filename) = filename else {
            return Err(Error::validation_with_context(
                "upload needs a target filename",
                ErrorContext::new()
                    .with_field_path("filename")
                    .with_source("upload"),
            ));
        };

        let mut params = RequestParams::action("upload")
            .with("filename", filename.as_str())
            .with(
                "comment",
                options.comment.as_deref().unwrap_or(DEFAULT_UPLOAD_COMMENT),
            )
            .with_opt("text", options.text.as_deref())
            .with_flag("watch", options.watch)
            .with_flag("ignorewarnings", options.ignore_warnings);
        match source {
            UploadSource::File(path) => {
                // fail on an unreadable file before spending a token round trip
                std::fs::metadata(&path)?;
                params.insert("file", path);
            }
            UploadSource::Url(url) => params.insert("url", url),
            UploadSource::SessionKey(key) => params.insert("sessionkey", key),
        }

        let token = self.token(TokenKind::Edit, &filename)?;
        params.insert("token", token);
        Ok(self.execute(params, None)?.document)
    }

    /// Import an XML dump (requires the `import` right).
    pub fn import(&mut self, xml_file: impl AsRef<Path>) -> Result<Document> {
        let xml_file = xml_file.as_ref();
        std::fs::metadata(xml_file)?;
        // import tokens are not page specific
        let token = self.token(TokenKind::Import, "Main Page")?;
        let params = RequestParams::action("import")
            .with("xml", xml_file.to_path_buf())
            .with("token", token);
        Ok(self.execute(params, None)?.document)
    }

    /// Export pages as an XML dump. The returned document has a `mediawiki` root.
    pub fn export<S: AsRef<str>>(&mut self, titles: &[S]) -> Result<Document> {
        let titles = titles
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("|");
        let params = RequestParams::query()
            .with("titles", titles)
            .with_flag("export", true)
            .with_flag("exportnowrap", true);
        Ok(self.execute(params, None)?.document)
    }

    /// Run an arbitrary `action=query` and return its `<query>` element.
    pub fn custom_query(&mut self, params: RequestParams) -> Result<Element> {
        let response = self.execute(params.with("action", "query"), None)?;
        response
            .root()
            .child("query")
            .cloned()
            .ok_or_else(|| Error::from(ProtocolError::missing("query", "query")))
    }

    /// Review the latest revision of `title` (FlaggedRevs). `flags` are tag
    /// names and levels, e.g. `("accuracy", "1")`.
    pub fn review(
        &mut self,
        title: &str,
        flags: &[(&str, &str)],
        comment: Option<&str>,
    ) -> Result<Document> {
        let Some(revid) = self.revision(title)? else {
            return Err(Error::api(
                "missingtitle",
                format!("Article {} not found", title),
            ));
        };
        let token = self.token(TokenKind::Edit, title)?;
        let mut params = RequestParams::action("review")
            .with("revid", revid)
            .with("token", token)
            .with("comment", comment.unwrap_or(DEFAULT_REVIEW_COMMENT));
        for (name, level) in flags {
            params.insert(format!("flag_{}", name), *level);
        }
        Ok(self.execute(params, None)?.document)
    }

    /// Run a Semantic MediaWiki `#ask` query through `action=ask`.
    /// `printouts` are extra query parts such as `?Place` or `limit=5`.
    pub fn semantic_query(&mut self, query: &str, printouts: &[&str]) -> Result<Document> {
        let extensions = self.extensions()?;
        let version = match extensions.get(SEMANTIC_MEDIAWIKI) {
            Some(version) => version.as_deref(),
            None => {
                return Err(Error::validation_with_context(
                    "Semantic MediaWiki extension not installed",
                    ErrorContext::new().with_source("semantic_query"),
                ))
            }
        };
        if let Some(version) = version.filter(|v| !supports_ask(v)) {
            return Err(Error::validation_with_context(
                format!("Semantic MediaWiki {} has no action=ask", version),
                ErrorContext::new()
                    .with_details("action=ask needs Semantic MediaWiki 1.7 or later")
                    .with_source("semantic_query"),
            ));
        }

        let ask = std::iter::once(query)
            .chain(printouts.iter().copied())
            .collect::<Vec<_>>()
            .join("|");
        Ok(self
            .execute(RequestParams::action("ask").with("query", ask), None)?
            .document)
    }
}

/// `true` from 1.7 on; unparsable versions are assumed recent.
fn supports_ask(version: &str) -> bool {
    let mut parts = version.split('.').map(|part| {
        part.chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse::<u32>()
            .ok()
    });
    match (parts.next().flatten(), parts.next().flatten()) {
        (Some(major), minor) => (major, minor.unwrap_or(0)) >= (1, 7),
        (None, _) => true,
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
