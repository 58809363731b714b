//! 请求引擎：一次逻辑 API 调用的完整生命周期。
//!
//! Request engine: one logical API call.
//!
//! The call is an explicit state machine rather than recursion:
//!
//! ```text
//! Send ──503, attempts left──▶ RetryWait ──▶ Send
//!  │
//!  ├─ login/createaccount "needtoken" (once) ──▶ Reauth ──▶ Send
//!  │
//!  └─ 2xx, parsed ──▶ Done
//! ```
//!
//! Each `Send` validates its own status, so a successful retry is never
//! re-checked by an outer frame.

use crate::params::RequestParams;
use crate::protocol::{DocPath, Document, ProtocolError};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::{Error, ErrorContext, Result};
use std::time::Duration;
use tracing::{debug, debug_span, info, warn};
use uuid::Uuid;

use super::core::{ApiResponse, Gateway};
use super::policy::Decision;

enum State {
    Send,
    RetryWait { delay: Duration },
    Reauth { param: &'static str, token: String },
    Done(ApiResponse),
}

/// Actions that negotiate a token in a second round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Negotiation {
    Login,
    CreateAccount,
}

enum Outcome {
    Success,
    NeedToken(String),
}

impl Negotiation {
    fn for_action(action: &str) -> Option<Self> {
        match action {
            "login" => Some(Negotiation::Login),
            "createaccount" => Some(Negotiation::CreateAccount),
            _ => None,
        }
    }

    fn action(&self) -> &'static str {
        match self {
            Negotiation::Login => "login",
            Negotiation::CreateAccount => "createaccount",
        }
    }

    /// Parameter that carries the token on the second round.
    fn token_param(&self) -> &'static str {
        match self {
            Negotiation::Login => "lgtoken",
            Negotiation::CreateAccount => "token",
        }
    }

    fn outcome(&self, document: &Document) -> Result<Outcome> {
        let action = self.action();
        let element = document
            .root()
            .child(action)
            .ok_or_else(|| ProtocolError::missing(action, action))?;
        let result = element.attr("result").unwrap_or_default();

        match result.to_ascii_lowercase().as_str() {
            "success" => Ok(Outcome::Success),
            "needtoken" => {
                let token = element
                    .attr("token")
                    .ok_or_else(|| ProtocolError::missing(action, format!("{}/@token", action)))?;
                Ok(Outcome::NeedToken(token.to_string()))
            }
            _ => Err(Error::unauthorized(format!("{} failed: {}", action, result))),
        }
    }
}

impl<T: Transport> Gateway<T> {
    /// Execute one API call.
    ///
    /// Adds `format=xml` and the configured `maxlag`, sends `action=query` as
    /// GET and everything else as POST, merges response cookies into the
    /// session, retries 503 answers, and completes the login/createaccount
    /// token round. When `continuation` is given and the response carries a
    /// `query-continue` element, the path's first value is returned as the
    /// continuation.
    pub fn execute(
        &mut self,
        params: RequestParams,
        continuation: Option<&DocPath>,
    ) -> Result<ApiResponse> {
        let action = params
            .action_name()
            .map(str::to_string)
            .ok_or_else(|| {
                Error::validation_with_context(
                    "request has no 'action' parameter",
                    ErrorContext::new()
                        .with_field_path("action")
                        .with_source("request_engine"),
                )
            })?;

        let mut params = params
            .with("format", "xml")
            .with("maxlag", self.config.maxlag);
        let negotiation = Negotiation::for_action(&action);

        let request_id = Uuid::new_v4();
        let span = debug_span!("api_request", action = action.as_str(), request_id = %request_id);
        let _enter = span.enter();

        let mut attempt: u32 = 1;
        let mut reauthed = false;
        let mut state = State::Send;

        loop {
            state = match state {
                State::Send => {
                    let response = self.dispatch(&params)?;
                    match self.policy.decide(response.status, attempt) {
                        Decision::Retry { delay } => State::RetryWait { delay },
                        Decision::Fail => {
                            return Err(ProtocolError::BadStatus {
                                status: response.status,
                                body: String::from_utf8_lossy(&response.body).into_owned(),
                                hint: None,
                            }
                            .into())
                        }
                        Decision::Proceed => {
                            let document = self.parser.parse(&response.body)?;
                            match negotiation {
                                Some(n) => match n.outcome(&document)? {
                                    Outcome::Success => {
                                        info!(action = n.action(), "negotiation succeeded");
                                        State::Done(ApiResponse {
                                            document,
                                            continuation: None,
                                        })
                                    }
                                    Outcome::NeedToken(_) if reauthed => {
                                        return Err(Error::unauthorized(format!(
                                            "{} failed: server requested a token twice",
                                            n.action()
                                        )))
                                    }
                                    Outcome::NeedToken(token) => State::Reauth {
                                        param: n.token_param(),
                                        token,
                                    },
                                },
                                None => {
                                    let continuation = continuation_value(&document, continuation);
                                    State::Done(ApiResponse {
                                        document,
                                        continuation,
                                    })
                                }
                            }
                        }
                    }
                }
                State::RetryWait { delay } => {
                    warn!(
                        attempt,
                        retry_count = self.policy.retry_count,
                        delay_secs = delay.as_secs(),
                        "503 Service Unavailable, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                    State::Send
                }
                State::Reauth { param, token } => {
                    debug!(param, "server requested a token, repeating request");
                    params.insert(param, token);
                    reauthed = true;
                    // the token round is a fresh request with its own retry budget
                    attempt = 1;
                    State::Send
                }
                State::Done(response) => return Ok(response),
            };
        }
    }

    fn dispatch(&mut self, params: &RequestParams) -> Result<HttpResponse> {
        let method = if params.action_name() == Some("query") {
            Method::Get
        } else {
            Method::Post
        };
        debug!(
            method = ?method,
            params = %params.redacted(),
            cookies = ?self.session.cookies().keys().collect::<Vec<_>>(),
            "sending API request"
        );

        let request = HttpRequest {
            method,
            url: self.session.base_url(),
            params,
            cookie_header: self.session.cookie_header(),
        };
        let mut response = self.transport.send(&request)?;

        debug!(
            status = response.status,
            bytes = response.body.len(),
            "received API response"
        );
        self.session
            .merge_cookies(std::mem::take(&mut response.cookies));
        Ok(response)
    }
}

fn continuation_value(document: &Document, path: Option<&DocPath>) -> Option<String> {
    let path = path?;
    document.root().child("query-continue")?;
    path.first_value(document.root())
}
