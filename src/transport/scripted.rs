//! Canned-response transport for engine tests.

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::params::RequestParams;
use crate::Result;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub url: String,
    pub params: RequestParams,
    pub cookie_header: Option<String>,
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(HttpResponse::new(status, body.to_string()))
    }

    pub fn push(self, response: HttpResponse) -> Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(Recorded {
            method: request.method,
            url: request.url.to_string(),
            params: request.params.clone(),
            cookie_header: request.cookie_header.clone(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no scripted response left".to_string()).into())
    }
}
