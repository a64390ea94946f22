//! Buffered HTTP response written by a request context.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::StatusCode;

/// HTTP response type produced from a [`ResponseWriter`].
pub type Response = http::Response<Bytes>;

/// A response that is being written.
///
/// The status code can only be written once: the first call to
/// [`ResponseWriter::write_status`], or the first body write, commits the
/// response. Headers set after that point are still recorded, but the status
/// stays what it was when the response was committed.
///
/// # Examples
///
/// ```
/// use reqctx_core::StatusCode;
/// use reqctx_core::response::ResponseWriter;
///
/// let mut writer = ResponseWriter::new();
/// writer.write_status(StatusCode::CREATED);
/// writer.write_body(b"done");
///
/// let response = writer.into_response();
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body().as_ref(), b"done");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    committed: bool,
}

impl ResponseWriter {
    /// Creates an empty, uncommitted response with status 200 OK.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the status code that is (or will be) sent.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sets a header, replacing any previous values with the same name.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Writes the status code and commits the response.
    ///
    /// Writing the status of an already committed response has no effect.
    pub fn write_status(&mut self, status: StatusCode) {
        if self.committed {
            warn!(
                current = %self.status,
                ignored = %status,
                "response already committed; ignoring status write"
            );
            return;
        }
        self.status = status;
        self.committed = true;
    }

    /// Appends bytes to the response body, committing the response with the
    /// current status first if needed.
    pub fn write_body(&mut self, bytes: &[u8]) {
        if !self.committed {
            self.write_status(self.status);
        }
        self.body.extend_from_slice(bytes);
    }

    /// Returns `true` once the status code has been written.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Returns the body written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the written data into an [`http::Response`].
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl std::io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_body(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
