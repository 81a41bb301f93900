use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use super::Transport;
use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};

/// Blocking `ureq` agent driven from a tokio blocking thread.
///
/// Status codes are always returned as data, never as errors, so the
/// validator sees 4xx/5xx responses. Response bodies are read in full with
/// no size cap unless [`with_body_limit`](Self::with_body_limit) sets one.
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: Option<u64>,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Wrap an existing agent. It should have `http_status_as_error(false)`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            body_limit: None,
        }
    }

    /// Fail responses whose body exceeds `limit` bytes. The status is still
    /// reported alongside the transport error.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = Some(limit);
        self
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let body_limit = self.body_limit.unwrap_or(u64::MAX);
        tokio::task::spawn_blocking(move || execute(&agent, request, body_limit))
            .await
            .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?
    }
}

fn execute(agent: &ureq::Agent, request: HttpRequest, body_limit: u64) -> Result<HttpResponse, TransportError> {
    let mut builder = ureq::http::Request::builder()
        .method(request.method.as_str())
        .uri(request.url.as_str());

    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(directive) = request.cache_policy.and_then(|policy| policy.cache_control()) {
        if request.header("cache-control").is_none() {
            builder = builder.header("cache-control", directive);
        }
    }
    if let Some(credential) = &request.credential {
        if request.header("authorization").is_none() {
            builder = builder.header("authorization", credential.authorization());
        }
    }

    let timeout = request.timeout;
    debug!(method = %request.method, url = %request.url, ?timeout, "ureq dispatch");
    match request.body {
        Some(body) => {
            let request = builder.body(body.to_vec()).map_err(invalid_request)?;
            run(agent, request, timeout, body_limit)
        }
        None => {
            let request = builder.body(()).map_err(invalid_request)?;
            run(agent, request, timeout, body_limit)
        }
    }
}

fn run<S: ureq::AsSendBody>(
    agent: &ureq::Agent,
    request: ureq::http::Request<S>,
    timeout: Option<Duration>,
    body_limit: u64,
) -> Result<HttpResponse, TransportError> {
    let request = match timeout {
        Some(timeout) => agent
            .configure_request(request)
            .timeout_global(Some(timeout))
            .build(),
        None => request,
    };

    let response = match agent.run(request) {
        Ok(response) => response,
        Err(ureq::Error::Protocol(e)) if is_response_parse_error(&e) => {
            // A reply arrived but its head could not be parsed.
            warn!(error = %e, "unparseable HTTP response");
            return Ok(HttpResponse::default());
        }
        Err(e) => return Err(map_error(e)),
    };

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .into_body()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
        .map_err(|e| map_body_error(e).with_status(status))?;

    Ok(HttpResponse {
        status: Some(status),
        headers,
        body: Bytes::from(body),
    })
}

fn map_error(error: ureq::Error) -> TransportError {
    let kind = match &error {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::BadUri(_) | ureq::Error::Http(_) | ureq::Error::Protocol(_) => {
            TransportErrorKind::InvalidRequest
        }
        ureq::Error::Io(_) => TransportErrorKind::Io,
        _ => TransportErrorKind::Other,
    };
    warn!(?kind, error = %error, "ureq transport failure");
    TransportError::new(kind, error.to_string())
}

/// A framing error in the body is the server's doing, not the request's.
fn map_body_error(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::Protocol(e) => {
            warn!(error = %e, "malformed response body");
            TransportError::new(TransportErrorKind::Other, e.to_string())
        }
        other => map_error(other),
    }
}

/// Errors raised while parsing the response head, as opposed to ones the
/// request itself caused.
fn is_response_parse_error(error: &ureq_proto::Error) -> bool {
    matches!(
        error,
        ureq_proto::Error::HttpParseFail(_)
            | ureq_proto::Error::HttpParseTooManyHeaders
            | ureq_proto::Error::UnsupportedVersion
            | ureq_proto::Error::HeadersWith100
    )
}

fn invalid_request(error: ureq::http::Error) -> TransportError {
    TransportError::new(TransportErrorKind::InvalidRequest, error.to_string())
}
