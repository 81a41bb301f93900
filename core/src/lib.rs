//! Fluent HTTP request builder with uniform response envelopes.
//!
//! # Overview
//! A [`Session`] binds a [`Transport`] and an optional base URL and hands
//! out [`RequestBuilder`]s. A builder accumulates headers, query parameters,
//! a body, codecs and transport hints, then a terminal verb (`get`,
//! `post_as`, ...) dispatches it and returns an [`Envelope`] holding the
//! decoded data, the [`StatusClass`] and any [`Error`].
//!
//! # Design
//! - The core never performs I/O itself; the transport does (host-does-IO).
//!   [`UreqTransport`] is provided behind the `ureq-transport` feature.
//! - Terminal verbs never fail: every error lands in the envelope.
//! - Status codes map to a closed two-family taxonomy in [`status`].
//! - Codecs work on `serde_json::Value`, so they can be swapped at runtime.

pub mod builder;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod status;
pub mod transport;
pub mod validate;

pub use builder::{DecodeAs, RequestBuilder};
pub use bytes::Bytes;
pub use codec::{Decoder, Encoder, FormCodec, JsonCodec};
pub use config::SessionConfig;
pub use envelope::Envelope;
pub use error::{Error, ErrorKind, TransportError, TransportErrorKind};
pub use http::{CachePolicy, ContentType, Credential, HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use status::{ErrorStatus, StatusClass, SuccessStatus};
pub use transport::Transport;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
pub use validate::validate;
