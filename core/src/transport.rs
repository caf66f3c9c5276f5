//! Executes `HttpRequest` values against the network.
//!
//! `UreqTransport` is the default. Anything that can turn one request into
//! one response implements [`Transport`]; tests use this seam to record
//! requests and to script responses or failures.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs exactly one HTTP round-trip per call.
///
/// Implementations must return non-2xx responses as data: status
/// interpretation belongs to the caller. Only failures below HTTP are
/// reported as [`Error::Transport`].
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// A fresh agent is built for every request so per-request timeouts apply
/// and no connection is reused between calls. Redirects are not followed:
/// a 3xx is returned as the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn agent(request: &HttpRequest) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_connect(request.connect_timeout)
            .timeout_global(request.timeout)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let agent = Self::agent(request);
        debug!(method = %request.method, url = %request.url, body_len = request.body.len(), "dispatching request");

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(&request.url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(&request.url), &request.headers).call(),
            HttpMethod::Post => {
                with_headers(agent.post(&request.url), &request.headers).send(request.body.as_bytes())
            }
            HttpMethod::Put => {
                with_headers(agent.put(&request.url), &request.headers).send(request.body.as_bytes())
            }
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec().map_err(transport_error)?;
        debug!(status, body_len = body.len(), "received response");

        Ok(HttpResponse::new(status, body))
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn transport_error(err: ureq::Error) -> Error {
    let kind = match &err {
        ureq::Error::HostNotFound => TransportErrorKind::HostNotFound,
        ureq::Error::ConnectionFailed => TransportErrorKind::ConnectionFailed,
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::Tls(_) => TransportErrorKind::Tls,
        ureq::Error::Io(_) => TransportErrorKind::Io,
        ureq::Error::BadUri(_) => TransportErrorKind::InvalidUrl,
        _ => TransportErrorKind::Other,
    };
    Error::Transport {
        kind,
        message: err.to_string(),
    }
}
