//! HTTP transport
//!
//! The engine never talks to `reqwest` directly: it hands a fully prepared
//! [`HttpRequest`] to a [`Transport`] and gets status, body and cookies back.

mod http;

#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpTransport;

use crate::params::RequestParams;
use crate::Result;
use bytes::Bytes;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Parameters in the query string.
    Get,
    /// Parameters in a form body (multipart when files are present).
    Post,
}

/// One prepared HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: &'a Url,
    pub params: &'a RequestParams,
    /// Value for the `Cookie` header.
    pub cookie_header: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
    /// Cookies set by the server, name to value.
    pub cookies: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            cookies: Vec::new(),
        }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }
}

/// Executes a single HTTP exchange. No retries, no parsing.
pub trait Transport {
    fn send(&self, request: &HttpRequest<'_>) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
