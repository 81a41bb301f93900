//! The uniform result of a dispatch.

use crate::error::Error;
use crate::status::StatusClass;

/// Decoded payload, status classification and error of one request.
///
/// `status` is `None` only when no HTTP response was received or it could
/// not be classified. `error` is set whenever some stage failed, including
/// an error-family status.
#[derive(Debug)]
pub struct Envelope<T> {
    data: Option<T>,
    status: Option<StatusClass>,
    error: Option<Error>,
    headers: Vec<(String, String)>,
}

impl<T> Envelope<T> {
    pub(crate) fn new(
        data: Option<T>,
        status: Option<StatusClass>,
        error: Option<Error>,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            data,
            status,
            error,
            headers,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn status(&self) -> Option<StatusClass> {
        self.status
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Response headers, empty when no response was received.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        crate::http::find_header(&self.headers, name)
    }

    /// Data present, no error, and a success-family status.
    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none() && self.status.is_some_and(StatusClass::is_success)
    }

    pub fn into_parts(self) -> (Option<T>, Option<StatusClass>, Option<Error>) {
        (self.data, self.status, self.error)
    }

    /// Collapse into a `Result`, preferring the error when one is set.
    pub fn into_result(self) -> Result<T, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.data
            .ok_or_else(|| Error::Decode("response carried no data".to_string()))
    }
}
