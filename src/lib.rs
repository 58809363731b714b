//! # mediawiki-gateway
//!
//! 面向 MediaWiki API 的同步客户端网关：请求引擎、响应解析、令牌管理与续传迭代。
//!
//! Client gateway for the MediaWiki action API.
//!
//! ## Overview
//!
//! One [`Gateway`] talks to one wiki's `api.php`. It owns the session cookies,
//! sends every call through a single request engine, and turns XML responses
//! into documents or typed errors. Everything else (fetching pages, editing,
//! listing categories) is a thin operation that assembles parameters and
//! hands them to the engine.
//!
//! ## Key Features
//!
//! - **Request engine**: `format=xml` and `maxlag` on every call, GET for
//!   `action=query` and POST for everything else, multipart when a parameter is
//!   a file, cookie echo, fixed-delay retry on 503
//! - **Token negotiation**: the two-step `login`/`createaccount` handshake is
//!   handled inside the engine, bounded to one extra round
//! - **Token manager**: action, undelete, user-rights and options tokens
//! - **Continuation**: list queries are exposed as lazy iterators that follow
//!   `query-continue` until the server stops
//! - **Error taxonomy**: [`Error::Api`] for server-reported errors (and
//!   promoted warnings), [`Error::Unauthorized`] for permission problems,
//!   [`Error::Protocol`] for responses that are not API documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mediawiki_gateway::{EditOptions, GatewayBuilder};
//!
//! fn main() -> mediawiki_gateway::Result<()> {
//!     let mut wiki = GatewayBuilder::new("https://wiki.example.org/w/api.php")
//!         .maxlag(5)
//!         .build()?;
//!
//!     wiki.login("Bot", "secret", None)?;
//!     if let Some(text) = wiki.get("Sandbox")? {
//!         wiki.edit("Sandbox", &format!("{}\n\nMore.", text), &EditOptions::default())?;
//!     }
//!     for title in wiki.category_members("Category:Stubs")? {
//!         println!("{}", title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | The gateway, its engine, tokens, continuation and operations |
//! | [`protocol`] | Response documents, path expressions and the response parser |
//! | [`transport`] | The HTTP seam and its `reqwest` implementation |
//! | [`config`] | Gateway configuration and the warning policy |
//! | [`params`] | Ordered request parameters |
//! | [`session`] | Cookies and login state |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod gateway;
pub mod params;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::{GatewayConfig, WarningPolicy};
pub use error::{Error, ErrorContext};
pub use gateway::{
    ApiResponse, BacklinkFilter, EditOptions, Gateway, GatewayBuilder, ListItem, ListIter,
    ListQuery, MoveOptions, PageRef, ProtectOptions, Protection, TokenKind, UploadOptions,
    UploadSource,
};
pub use params::{ParamValue, RequestParams};
pub use protocol::{DocPath, Document, Element};
pub use session::Session;
pub use transport::{HttpTransport, Transport};

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;
