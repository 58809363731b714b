//! Mock wiki server for integration tests

use mediawiki_gateway::{Gateway, GatewayBuilder};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::time::Duration;

pub const API_PATH: &str = "/w/api.php";

/// A mockito server standing in for a wiki's `api.php`.
pub struct WikiServer {
    pub server: ServerGuard,
}

impl WikiServer {
    pub fn new() -> Self {
        Self {
            server: Server::new(),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.server.url(), API_PATH)
    }

    /// Builder pointed at the mock with retries that do not sleep.
    pub fn builder(&self) -> GatewayBuilder {
        GatewayBuilder::new(self.api_url()).retry_delay(Duration::ZERO)
    }

    pub fn gateway(&self) -> Gateway {
        self.builder().build().expect("gateway builds")
    }

    /// GET mock whose query string contains every pair.
    pub fn query(&mut self, pairs: &[(&str, &str)]) -> mockito::Mock {
        self.server
            .mock("GET", API_PATH)
            .match_query(encoded(pairs))
    }

    /// POST mock whose form body contains every pair.
    pub fn post(&mut self, pairs: &[(&str, &str)]) -> mockito::Mock {
        self.server
            .mock("POST", API_PATH)
            .match_body(encoded(pairs))
    }

    /// XML 200 response for a GET with the given pairs.
    pub fn query_xml(&mut self, pairs: &[(&str, &str)], body: &str) -> Mock {
        self.query(pairs).with_status(200).with_body(xml(body)).create()
    }

    /// XML 200 response for a POST with the given pairs.
    pub fn post_xml(&mut self, pairs: &[(&str, &str)], body: &str) -> Mock {
        self.post(pairs).with_status(200).with_body(xml(body)).create()
    }
}

/// All pairs must be present, url-encoded, in any order.
pub fn encoded(pairs: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
            .collect(),
    )
}

pub fn xml(body: &str) -> String {
    format!(r#"<?xml version="1.0"?>{}"#, body)
}
