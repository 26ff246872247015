//! Incoming HTTP request type.

use std::collections::HashMap;

use crate::method::Method;
use crate::route::Route;

/// An incoming HTTP request, parsed from the raw TCP stream.
///
/// Header names are stored lowercase; a repeated header keeps its last value.
/// `route` and `params` are filled in by the parser once the request line has
/// been matched against the route table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    pub(crate) method: Option<Method>,
    pub(crate) target: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<String>,
    pub(crate) route: Option<Route>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// `None` only for the empty context used when answering an unparseable request.
    pub fn method(&self) -> Option<Method> { self.method }
    pub fn target(&self) -> &str { &self.target }
    pub fn headers(&self) -> &HashMap<String, String> { &self.headers }
    pub fn body(&self) -> Option<&str> { self.body.as_deref() }
    pub fn route(&self) -> Option<&Route> { self.route.as_ref() }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/files/{filename}`, `req.param("filename")` on
    /// `/files/a.txt` returns `Some("a.txt")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// `true` when the client sent `Connection: close` (any case).
    pub fn wants_close(&self) -> bool {
        self.header("connection").is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}

/// Assembles a [`Request`] by hand, for handler tests and embedding.
#[derive(Default)]
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.inner.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.inner.target = target.into();
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.inner.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.inner.body = Some(body.into());
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.inner.route = Some(route);
        self
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.inner.params.insert(name.to_owned(), value.into());
        self
    }

    pub fn build(self) -> Request {
        self.inner
    }
}
