//! Error types for the request pipeline.
//!
//! # Design
//! A single `Error` enum covers every stage: configuration, transport,
//! encoding, HTTP status and decoding. Construction-time failures are
//! returned as `Result`; dispatch-time failures are folded into the
//! [`Envelope`](crate::Envelope) so terminal verbs never fail outright.
//!
//! An error-family status is a normal outcome and is carried as
//! `Error::Status` with its full classification.

use thiserror::Error;

use crate::status::ErrorStatus;

/// Coarse error category, for callers that branch on the failure stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    /// No HTTP response was received.
    Transport,
    /// A response arrived but its status was missing or unrecognized.
    Protocol,
    Encoding,
    Status,
    Decoding,
}

/// Errors produced while building, dispatching or decoding a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A URL string could not be parsed.
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A relative path was requested but the session has no base URL.
    #[error("no base URL configured for relative path {path:?}")]
    MissingBaseUrl { path: String },

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The transport failed. When the failure came after the status line,
    /// the envelope still carries that status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The transport replied without a usable HTTP status.
    #[error("response carried no HTTP status code")]
    MissingStatusCode,

    /// The status code matched neither status table.
    #[error("unrecognized HTTP status code {code}")]
    UnrecognizedStatus { code: u16 },

    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The server answered with an error-family status.
    #[error("HTTP {}: {}", .0.code(), .0.failure_reason())]
    Status(ErrorStatus),

    /// The response body could not be decoded into the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl { .. } | Error::MissingBaseUrl { .. } | Error::Config(_) => {
                ErrorKind::Configuration
            }
            Error::Transport(_) => ErrorKind::Transport,
            Error::MissingStatusCode | Error::UnrecognizedStatus { .. } => ErrorKind::Protocol,
            Error::Encode(_) => ErrorKind::Encoding,
            Error::Status(_) => ErrorKind::Status,
            Error::Decode(_) => ErrorKind::Decoding,
        }
    }

    /// The error-family status, when the failure is an HTTP status.
    pub fn status(&self) -> Option<ErrorStatus> {
        match self {
            Error::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// What went wrong inside a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    InvalidRequest,
    Io,
    Other,
}

/// A connectivity or protocol failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error ({kind:?}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// Status code already received when the failure happened, e.g. while
    /// reading the body.
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Record the status code of a response that failed part way.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}
