//! HTTP requests and responses described as plain data.
//!
//! # Design
//! `Connection` builds an `HttpRequest` value and classifies an
//! `HttpResponse` value without touching the network. A [`Transport`]
//! sits between the two and performs the actual I/O, which keeps request
//! construction and status handling deterministic and easy to test.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_CSV: &str = "application/csv";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute. Timeouts travel with the request so a transport needs
/// no other configuration; `None` means no limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// First header value matching `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// The body is kept as raw bytes: decoding it is part of classifying the
/// response, not of receiving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Resource path relative to the service endpoint.
///
/// Segments are percent-encoded when joined onto the endpoint, so
/// caller-supplied identifiers cannot add path components or a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ApiPath {
    /// The service root, used by analysis requests.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter when `value` is present.
    pub fn query_opt(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve against `endpoint`, e.g. `https://api.textrazor.com/`.
    pub fn resolve(&self, endpoint: &str) -> Result<String> {
        let mut url = Url::parse(endpoint)
            .map_err(|e| Error::validation(format!("invalid endpoint {endpoint:?}: {e}")))?;
        if !self.segments.is_empty() {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::validation(format!("endpoint {endpoint:?} cannot be a base URL")))?;
            path.pop_if_empty();
            path.extend(self.segments.iter());
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url.into())
    }
}
