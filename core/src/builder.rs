//! Fluent request builder and the dispatch pipeline.
//!
//! # Design
//! `RequestBuilder` is consumed by value: every setter takes `self` and
//! hands it back, and every terminal verb consumes it. A builder therefore
//! has one owner and is dispatched at most once.
//!
//! Dispatch runs: assemble [`HttpRequest`] → [`Transport::send`] →
//! [`validate`] → decode. Each stage that can fail folds its error into the
//! returned [`Envelope`]; nothing escapes as a `Result` or a panic.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::codec::{Decoder, Encoder, JsonCodec};
use crate::envelope::Envelope;
use crate::error::Error;
use crate::http::{find_header, CachePolicy, ContentType, Credential, HttpMethod, HttpRequest, HttpResponse};
use crate::status::StatusClass;
use crate::transport::Transport;
use crate::validate::validate;

const CONTENT_TYPE: &str = "Content-Type";

/// Declares the type a typed verb decodes into, and whether an absent
/// value is acceptable.
///
/// ```ignore
/// builder.get_as(DecodeAs::<User>::new());            // body required
/// builder.get_as(DecodeAs::<Option<User>>::optional()); // empty body is `None`
/// ```
pub struct DecodeAs<T> {
    nilable: bool,
    _target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> DecodeAs<T> {
    pub fn new() -> Self {
        Self {
            nilable: false,
            _target: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> DecodeAs<Option<T>> {
    /// Accept an empty body as `None`.
    pub fn optional() -> Self {
        Self {
            nilable: true,
            _target: PhantomData,
        }
    }
}

impl<T> DecodeAs<T> {
    pub fn is_nilable(&self) -> bool {
        self.nilable
    }
}

impl<T: DeserializeOwned> Default for DecodeAs<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DecodeAs<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DecodeAs<T> {}

impl<T> fmt::Debug for DecodeAs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeAs")
            .field("target", &std::any::type_name::<T>())
            .field("nilable", &self.nilable)
            .finish()
    }
}

/// Request body as last set on the builder.
#[derive(Debug, Clone)]
enum Payload {
    Structured(Value),
    Raw(Bytes),
    /// The value passed to `body` could not be represented; reported at dispatch.
    Unencodable(String),
}

/// A single request under construction.
pub struct RequestBuilder {
    transport: Arc<dyn Transport>,
    url: Url,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Payload>,
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn Decoder>,
    timeout: Option<Duration>,
    cache_policy: Option<CachePolicy>,
    credential: Option<Credential>,
}

/// Status, headers and normalized body of a classified response.
struct Exchange {
    body: Bytes,
    status: StatusClass,
    headers: Vec<(String, String)>,
}

/// A dispatch that stopped early. `status` is set only when the transport
/// failed after the status line arrived.
struct Failure {
    error: Error,
    status: Option<StatusClass>,
    headers: Vec<(String, String)>,
}

impl Failure {
    fn new(error: Error, headers: Vec<(String, String)>) -> Self {
        Self {
            error,
            status: None,
            headers,
        }
    }

    fn into_envelope<T>(self) -> Envelope<T> {
        Envelope::new(None, self.status, Some(self.error), self.headers)
    }
}

impl RequestBuilder {
    /// A GET-by-default builder for `url` using the JSON codec.
    pub fn new(transport: Arc<dyn Transport>, url: Url) -> Self {
        Self {
            transport,
            url,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            encoder: Arc::new(JsonCodec),
            decoder: Arc::new(JsonCodec),
            timeout: None,
            cache_policy: None,
            credential: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Set one header, replacing any existing header of the same name
    /// (compared case-insensitively).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match self.headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Replace the whole header set.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.clear();
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Set one query parameter, replacing any previous value for `key`.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        match self.query.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.query.push((key, value)),
        }
        self
    }

    /// Replace the whole query parameter set.
    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query.clear();
        params
            .into_iter()
            .fold(self, |builder, (key, value)| builder.query_param(key, value))
    }

    /// Use a structured value as the body. It is encoded with the
    /// configured encoder at dispatch. Replaces any previous body.
    pub fn body<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.body = Some(match serde_json::to_value(value) {
            Ok(value) => Payload::Structured(value),
            Err(e) => Payload::Unencodable(e.to_string()),
        });
        self
    }

    /// Use raw bytes as the body, sent as-is. Replaces any previous body.
    pub fn body_bytes(mut self, bytes: impl Into<Bytes>) -> Self {
        self.body = Some(Payload::Raw(bytes.into()));
        self
    }

    pub fn content_type(self, content_type: ContentType) -> Self {
        self.header(CONTENT_TYPE, content_type.mime())
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Dispatch with `method` and return the validated body bytes.
    ///
    /// The bytes are kept even for an error-family status, in which case
    /// `error` is also set.
    pub async fn send(self, method: HttpMethod) -> Envelope<Bytes> {
        match self.exchange(method, false).await {
            Ok(Exchange { body, status, headers }) => {
                let error = status.as_error().map(Error::Status);
                Envelope::new(Some(body), Some(status), error, headers)
            }
            Err(failure) => failure.into_envelope(),
        }
    }

    /// Dispatch with `method` and decode the body as `T`.
    pub async fn send_as<T: DeserializeOwned>(self, method: HttpMethod, decode_as: DecodeAs<T>) -> Envelope<T> {
        let decoder = Arc::clone(&self.decoder);
        let Exchange { body, status, headers } = match self.exchange(method, decode_as.nilable).await {
            Ok(exchange) => exchange,
            Err(failure) => return failure.into_envelope(),
        };

        if let Some(error_status) = status.as_error() {
            return Envelope::new(None, Some(status), Some(Error::Status(error_status)), headers);
        }

        let decoded = decoder
            .decode(&body)
            .and_then(|value| serde_json::from_value::<T>(value).map_err(|e| e.to_string()));
        match decoded {
            Ok(data) => Envelope::new(Some(data), Some(status), None, headers),
            Err(e) => {
                warn!(error = %e, decode_target = std::any::type_name::<T>(), "response decode failed");
                Envelope::new(None, Some(status), Some(Error::Decode(e)), headers)
            }
        }
    }

    async fn exchange(
        self,
        method: HttpMethod,
        nilable: bool,
    ) -> Result<Exchange, Failure> {
        let transport = Arc::clone(&self.transport);
        let request = self.into_request(method).map_err(|e| {
            warn!(error = %e, "request body encoding failed");
            Failure::new(e, Vec::new())
        })?;

        debug!(method = %request.method, url = %request.url, "dispatching request");
        trace!(
            headers = ?request.headers,
            body_len = request.body.as_ref().map_or(0, Bytes::len),
            "request detail"
        );

        let HttpResponse { status, headers, body } = match transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, status = ?e.status, "transport failed");
                let status = e.status.and_then(|code| StatusClass::classify(code).ok());
                return Err(Failure {
                    error: Error::Transport(e),
                    status,
                    headers: Vec::new(),
                });
            }
        };

        match validate(body, status, nilable) {
            Ok((body, status)) => Ok(Exchange { body, status, headers }),
            Err(e) => Err(Failure::new(e, headers)),
        }
    }

    /// Assemble the wire request: query appended, body encoded.
    fn into_request(mut self, method: HttpMethod) -> Result<HttpRequest, Error> {
        let mut url = self.url;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        let body = match self.body {
            None => None,
            Some(Payload::Raw(bytes)) => Some(bytes),
            Some(Payload::Unencodable(reason)) => return Err(Error::Encode(reason)),
            Some(Payload::Structured(value)) => {
                let bytes = self.encoder.encode(&value).map_err(Error::Encode)?;
                if find_header(&self.headers, CONTENT_TYPE).is_none() {
                    self.headers
                        .push((CONTENT_TYPE.to_string(), self.encoder.content_type().mime().to_string()));
                }
                Some(bytes)
            }
        };

        Ok(HttpRequest {
            method,
            url,
            headers: self.headers,
            body,
            timeout: self.timeout,
            cache_policy: self.cache_policy,
            credential: self.credential,
        })
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("cache_policy", &self.cache_policy)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

macro_rules! verbs {
    ($( $method:ident => $raw:ident, $typed:ident; )+) => {
        impl RequestBuilder {
            $(
                #[doc = concat!("Send as `", stringify!($raw), "` and return the raw body.")]
                pub async fn $raw(self) -> Envelope<Bytes> {
                    self.send(HttpMethod::$method).await
                }

                #[doc = concat!("Send as `", stringify!($raw), "` and decode the body.")]
                pub async fn $typed<T: DeserializeOwned>(self, decode_as: DecodeAs<T>) -> Envelope<T> {
                    self.send_as(HttpMethod::$method, decode_as).await
                }
            )+
        }
    };
}

verbs! {
    Get => get, get_as;
    Post => post, post_as;
    Put => put, put_as;
    Delete => delete, delete_as;
    Patch => patch, patch_as;
    Head => head, head_as;
    Options => options, options_as;
    Trace => trace, trace_as;
}
