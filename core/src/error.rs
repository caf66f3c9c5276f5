//! Error types for the TextRazor client.
//!
//! # Design
//! Three classes of failure reach the caller. `Validation` is raised before
//! any network activity. `Transport` covers everything below HTTP (DNS,
//! connect, TLS, timeouts). `Service` and `MalformedResponse` both mean the
//! service answered but not with a usable 200 JSON body; callers that only
//! care about the class use [`Error::is_service_error`].

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied an argument or configuration value that cannot be
    /// sent: an empty identifier, an empty collection, or a dynamically
    /// sourced option of the wrong type.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error("network problem connecting to TextRazor ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    /// The service answered with a status other than 200.
    #[error("TextRazor returned HTTP code {status}: {body}")]
    Service { status: u16, body: String },

    /// The service answered 200 but the body is not valid JSON.
    #[error("TextRazor returned a malformed response: {reason}")]
    MalformedResponse { body: String, reason: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// True for both non-200 responses and malformed 200 responses.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service { .. } | Error::MalformedResponse { .. })
    }

    /// HTTP status associated with the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service { status, .. } => Some(*status),
            Error::MalformedResponse { .. } => Some(200),
            _ => None,
        }
    }
}

/// Low-level reason for a [`Error::Transport`] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    HostNotFound,
    ConnectionFailed,
    Timeout,
    Tls,
    Io,
    InvalidUrl,
    Other,
}

impl TransportErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            TransportErrorKind::HostNotFound => "host_not_found",
            TransportErrorKind::ConnectionFailed => "connection_failed",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Tls => "tls",
            TransportErrorKind::Io => "io",
            TransportErrorKind::InvalidUrl => "invalid_url",
            TransportErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
