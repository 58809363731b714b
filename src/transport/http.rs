use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::config::GatewayConfig;
use crate::params::{ParamValue, RequestParams};
use crate::Result;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::header::COOKIE;
use reqwest::Proxy;
use std::env;

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .gzip(true);

        if let Ok(proxy_url) = env::var("MW_GATEWAY_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        let url = request.url.clone();
        let mut req = match request.method {
            Method::Get => self.client.get(url).query(&request.params.text_pairs()),
            Method::Post if request.params.has_files() => {
                self.client.post(url).multipart(multipart_form(request.params)?)
            }
            Method::Post => self.client.post(url).form(&request.params.text_pairs()),
        };

        if let Some(cookie) = &request.cookie_header {
            req = req.header(COOKIE, cookie);
        }

        let response = req.send().map_err(TransportError::Http)?;
        let status = response.status().as_u16();
        let cookies = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.bytes().map_err(TransportError::Http)?;

        Ok(HttpResponse {
            status,
            body,
            cookies,
        })
    }
}

fn multipart_form(params: &RequestParams) -> Result<Form> {
    let mut form = Form::new();
    for (key, value) in params.iter() {
        form = match value {
            ParamValue::Text(text) => form.text(key.to_string(), text.clone()),
            ParamValue::File(path) => form.file(key.to_string(), path)?,
        };
    }
    Ok(form)
}
