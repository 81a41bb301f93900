//! Response validation.
//!
//! Classifies the raw status and normalizes an empty body for callers that
//! accept an absent value.

use bytes::Bytes;
use tracing::debug;

use crate::error::Error;
use crate::status::StatusClass;

/// Body substituted for an empty response when the target is nilable.
pub const NULL_BODY: &[u8] = b"null";

/// Classify `status` and normalize `body`.
///
/// Fails with [`Error::MissingStatusCode`] when the transport reported no
/// status. A non-2xx status is not a failure here; it comes back as a
/// [`StatusClass::Error`].
pub fn validate(body: Bytes, status: Option<u16>, nilable: bool) -> Result<(Bytes, StatusClass), Error> {
    let code = status.ok_or(Error::MissingStatusCode)?;
    let class = StatusClass::classify(code)?;
    debug!(code, status = %class, "classified response");

    let body = if body.is_empty() && nilable {
        Bytes::from_static(NULL_BODY)
    } else {
        body
    };
    Ok((body, class))
}
