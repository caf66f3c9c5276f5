//! Per-client connection state and the single request path shared by every
//! operation.
//!
//! # Design
//! `send_request` is split the same way as the rest of the crate: a pure
//! `build_request` that produces an `HttpRequest`, one call into the
//! [`Transport`], and a pure `parse_response` that classifies the outcome.
//! There is no retry at any step.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{ApiPath, HttpMethod, HttpRequest, HttpResponse};
use crate::settings::{seconds_to_timeout, Settings};
use crate::transport::{Transport, UreqTransport};

pub const API_KEY_HEADER: &str = "X-TextRazor-Key";

/// Connection values owned by one client instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub api_key: String,
    pub end_point: String,
    pub secure_end_point: String,
    pub enable_encryption: bool,
    pub enable_compression: bool,
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl ConnectionSettings {
    /// Copy `settings`, failing when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| Error::validation("invalid API key: no API key configured"))?;
        Ok(Self {
            api_key,
            end_point: settings.end_point.clone(),
            secure_end_point: settings.secure_end_point.clone(),
            enable_encryption: settings.enable_encryption,
            enable_compression: settings.enable_compression,
            connect_timeout: seconds_to_timeout(settings.connect_timeout_seconds),
            timeout: seconds_to_timeout(settings.timeout_seconds),
        })
    }

    /// The endpoint selected by the encryption flag.
    pub fn active_end_point(&self) -> &str {
        if self.enable_encryption {
            &self.secure_end_point
        } else {
            &self.end_point
        }
    }
}

/// Connection settings plus the transport that executes requests.
#[derive(Debug, Clone)]
pub struct Connection<T = UreqTransport> {
    settings: ConnectionSettings,
    transport: T,
}

impl Connection<UreqTransport> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_transport(settings, UreqTransport::new())
    }
}

impl<T: Transport> Connection<T> {
    pub fn with_transport(settings: &Settings, transport: T) -> Result<Self> {
        Ok(Self {
            settings: ConnectionSettings::from_settings(settings)?,
            transport,
        })
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.settings.api_key = api_key.into();
        self
    }

    pub fn set_end_point(&mut self, end_point: impl Into<String>) -> &mut Self {
        self.settings.end_point = end_point.into();
        self
    }

    pub fn set_secure_end_point(&mut self, end_point: impl Into<String>) -> &mut Self {
        self.settings.secure_end_point = end_point.into();
        self
    }

    pub fn set_enable_encryption(&mut self, enabled: bool) -> &mut Self {
        self.settings.enable_encryption = enabled;
        self
    }

    pub fn set_enable_compression(&mut self, enabled: bool) -> &mut Self {
        self.settings.enable_compression = enabled;
        self
    }

    /// 0 disables the limit.
    pub fn set_connect_timeout_seconds(&mut self, seconds: u64) -> &mut Self {
        self.settings.connect_timeout = seconds_to_timeout(seconds);
        self
    }

    /// 0 disables the limit.
    pub fn set_timeout_seconds(&mut self, seconds: u64) -> &mut Self {
        self.settings.timeout = seconds_to_timeout(seconds);
        self
    }

    /// Describe a request without sending it.
    pub fn build_request(
        &self,
        body: impl Into<String>,
        path: &ApiPath,
        method: HttpMethod,
        content_type: Option<&str>,
    ) -> Result<HttpRequest> {
        let url = path.resolve(self.settings.active_end_point())?;

        let mut headers = vec![(
            API_KEY_HEADER.to_string(),
            self.settings.api_key.trim().to_string(),
        )];
        let accept_encoding = if self.settings.enable_compression {
            "gzip"
        } else {
            "identity"
        };
        headers.push(("Accept-Encoding".to_string(), accept_encoding.to_string()));
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body: body.into(),
            connect_timeout: self.settings.connect_timeout,
            timeout: self.settings.timeout,
        })
    }

    /// Build, dispatch once, and decode the JSON reply.
    pub fn send_request(
        &self,
        body: impl Into<String>,
        path: &ApiPath,
        method: HttpMethod,
        content_type: Option<&str>,
    ) -> Result<Value> {
        let request = self.build_request(body, path, method, content_type)?;
        self.dispatch(&request)
    }

    /// Dispatch an already built request once and decode the JSON reply.
    pub fn dispatch(&self, request: &HttpRequest) -> Result<Value> {
        let response = self.transport.execute(request)?;
        parse_response(response)
    }
}

/// Resource identifiers must be non-empty.
pub(crate) fn require_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation(format!("{what} must have an ID")));
    }
    Ok(())
}

pub(crate) fn json_body<B: Serialize + ?Sized>(value: &B) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::validation(format!("cannot encode request body: {e}")))
}

/// Anything but 200 is a service error; a 200 must carry UTF-8 JSON.
///
/// Bodies are reported lossily decoded, so binary error pages still reach
/// the caller as a service error instead of a decoding failure.
pub fn parse_response(response: HttpResponse) -> Result<Value> {
    if response.status != 200 {
        return Err(Error::Service {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }
    serde_json::from_slice(&response.body).map_err(|e| Error::MalformedResponse {
        reason: e.to_string(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}
