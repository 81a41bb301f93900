//! The transport seam.
//!
//! The core never opens a socket. A [`Transport`] receives a fully built
//! [`HttpRequest`] and returns the raw status, headers and body; connection
//! management, TLS and retries all live behind it.

#[cfg(feature = "ureq-transport")]
mod ureq_agent;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "ureq-transport")]
pub use ureq_agent::UreqTransport;

/// Executes HTTP requests on behalf of a [`Session`](crate::Session).
///
/// Implementations must be shareable across tasks; a session hands the same
/// transport to every builder it creates.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the server replied.
    ///
    /// A reply without a readable status line should be returned as an
    /// `HttpResponse` with `status: None` rather than as an error. A failure
    /// after the status line arrived should set [`TransportError::status`].
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}
