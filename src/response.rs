//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! A [`Response`] is plain data: status, optional content type, caller
//! headers and an optional text body. Framing headers (`Content-Length`,
//! `Connection`, `Content-Encoding`) are decided by the writer, not here.

use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values the built-in handlers use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Json,         // application/json
    OctetStream,  // application/octet-stream  (file download)
    Text,         // text/plain
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use kettle::{ContentType, Response, Status};
///
/// Response::text("hello");
/// Response::status(Status::NotFound);
///
/// Response::builder()
///     .status(Status::Created)
///     .header("Location", "/files/a.txt")
///     .no_body();
///
/// Response::builder().body(ContentType::OctetStream, "raw");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub(crate) status: Status,
    pub(crate) content_type: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<String>,
}

impl Response {
    /// `200 OK` with `text/plain`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body and no content type.
    pub fn status(status: Status) -> Self {
        Self { status, content_type: None, headers: Vec::new(), body: None }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok }
    }

    pub fn get_status(&self) -> Status { self.status }
    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> Option<&str> { self.body.as_deref() }

    /// Sets a header, replacing any earlier value stored under the same name.
    ///
    /// Names are kept exactly as given.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        put_header(&mut self.headers, name.into(), value.into());
    }
}

/// Insert-or-replace on an ordered header list. A replaced entry keeps its
/// original position.
pub(crate) fn put_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(k, _)| *k == name) {
        Some(entry) => entry.1 = value,
        None => headers.push((name, value)),
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        put_header(&mut self.headers, name.to_owned(), value.to_owned());
        self
    }

    /// Terminate with a plain-text body (`text/plain`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.body(ContentType::Text, body)
    }

    /// Terminate with a typed body.
    pub fn body(self, content_type: ContentType, body: impl Into<String>) -> Response {
        Response {
            status: self.status,
            content_type: Some(content_type.as_str().to_owned()),
            headers: self.headers,
            body: Some(body.into()),
        }
    }

    /// Terminate with no body (e.g. `Status::Created`).
    pub fn no_body(self) -> Response {
        Response { status: self.status, content_type: None, headers: self.headers, body: None }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Lets handlers return a bare [`Status`] or a string instead of building a
/// [`Response`] by hand.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}
