//! 响应协议层：解析 API 响应文档并分类错误与警告。
//!
//! # Response Protocol Layer
//!
//! This module turns raw response bytes into a structured [`Document`] and
//! classifies what the wiki said about the request.
//!
//! ## Overview
//!
//! - [`Document::parse`] checks well-formedness and builds an element tree
//! - [`ResponseParser`] insists on an `<api>` or `<mediawiki>` root, raises
//!   `<error>` elements as [`crate::Error::Api`], and routes `<warnings>`
//!   through the configured [`crate::WarningPolicy`]
//! - [`DocPath`] is a typed path expression used to pull values (continuation
//!   markers, tokens, result lists) out of a document
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Element tree built from `quick-xml` events |
//! | [`path`] | Path expressions and evaluation |
//! | [`parser`] | API root validation and error/warning extraction |
//! | [`error`] | Protocol-level error types |
//!
//! ## Example
//!
//! ```rust
//! use mediawiki_gateway::protocol::{DocPath, ResponseParser};
//! use mediawiki_gateway::WarningPolicy;
//!
//! let parser = ResponseParser::new(WarningPolicy::Raise);
//! let doc = parser
//!     .parse(br#"<api><query><pages><page title="Main Page"/></pages></query></api>"#)
//!     .unwrap();
//! let path: DocPath = "query/pages/page/@title".parse().unwrap();
//! assert_eq!(path.first_value(doc.root()).as_deref(), Some("Main Page"));
//! ```

pub mod document;
pub mod error;
pub mod parser;
pub mod path;

pub use document::{Document, Element, Node};
pub use error::ProtocolError;
pub use parser::{ResponseParser, API_ROOTS};
pub use path::{DocPath, PathError, Selected};
