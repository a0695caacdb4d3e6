//! Response sink abstraction.
//!
//! Encoding needs three things from an HTTP response: mutable headers, a
//! status line and a body. Server integrations implement [`ResponseSink`] over
//! their own response writer; `http::Response<Vec<u8>>` is supported out of
//! the box.

use http::{HeaderMap, Response, StatusCode};

/// Output side of an HTTP exchange.
///
/// Headers must be final before [`write_status`](ResponseSink::write_status)
/// is called; the encoder always mutates headers first.
pub trait ResponseSink {
    /// Response headers, mutable until the status is written.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write the status code.
    fn write_status(&mut self, status: StatusCode) -> std::io::Result<()>;

    /// Append body bytes.
    fn write_body(&mut self, body: &[u8]) -> std::io::Result<()>;
}

impl ResponseSink for Response<Vec<u8>> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        Response::headers_mut(self)
    }

    fn write_status(&mut self, status: StatusCode) -> std::io::Result<()> {
        *self.status_mut() = status;
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> std::io::Result<()> {
        self.body_mut().extend_from_slice(body);
        Ok(())
    }
}
