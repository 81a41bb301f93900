//! Sessions bind a transport and an optional base URL, and hand out
//! request builders.
//!
//! # Design
//! A `Session` is cheap to clone and read-only once built, so it can be
//! shared across tasks. Changing the base URL or transport means building a
//! new session; requests already in flight keep whatever they started with.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::builder::RequestBuilder;
use crate::config::SessionConfig;
use crate::error::Error;
use crate::http::CachePolicy;
use crate::transport::Transport;

/// Factory for [`RequestBuilder`]s that share one transport.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    base_url: Option<Url>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    cache_policy: Option<CachePolicy>,
}

impl Session {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Build a session around an already shared transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: None,
            headers: Vec::new(),
            timeout: None,
            cache_policy: None,
        }
    }

    /// Build a session from `config`, validating its base URL.
    pub fn from_config(transport: impl Transport + 'static, config: &SessionConfig) -> Result<Self, Error> {
        let mut session = Self::new(transport);
        if let Some(base_url) = &config.base_url {
            session = session.with_base_url(base_url)?;
        }
        session.headers = config.headers.clone();
        session.timeout = config.timeout();
        session.cache_policy = config.cache_policy;
        Ok(session)
    }

    /// Set the base URL that [`request_path`](Self::request_path) resolves against.
    ///
    /// A base URL carrying a query string is rejected, since joining a path
    /// would drop it. Use [`RequestBuilder::query_param`] instead.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, Error> {
        let url = parse_url(base_url)?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("{base_url:?} cannot be used as a base URL")));
        }
        if url.query().is_some() {
            return Err(Error::Config(format!("base URL {base_url:?} must not carry a query string")));
        }
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// A builder for an absolute URL.
    pub fn request(&self, url: Url) -> RequestBuilder {
        let mut builder =
            RequestBuilder::new(Arc::clone(&self.transport), url).headers(self.headers.iter().cloned());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(policy) = self.cache_policy {
            builder = builder.cache_policy(policy);
        }
        builder
    }

    /// A builder for a URL string. Fails with [`Error::InvalidUrl`].
    pub fn request_str(&self, url: &str) -> Result<RequestBuilder, Error> {
        parse_url(url).map(|url| self.request(url))
    }

    /// A builder for `path` resolved against the base URL.
    ///
    /// The base URL is treated as a directory, so `http://host/api` plus
    /// `users/1` gives `http://host/api/users/1`. Fails with
    /// [`Error::MissingBaseUrl`] when no base URL is set.
    pub fn request_path(&self, path: &str) -> Result<RequestBuilder, Error> {
        let base = self.base_url.as_ref().ok_or_else(|| Error::MissingBaseUrl {
            path: path.to_string(),
        })?;
        let url = resolve(base, path)?;
        debug!(%url, "resolved relative request path");
        Ok(self.request(url))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("cache_policy", &self.cache_policy)
            .finish_non_exhaustive()
    }
}

fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|source| Error::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

fn resolve(base: &Url, path: &str) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    let path = path.trim_start_matches('/');
    base.join(path).map_err(|source| Error::InvalidUrl {
        url: path.to_string(),
        source,
    })
}
