//! The application route table.
//!
//! Routes are kept in registration order and matched segment by segment;
//! the first match wins. Build the table once at startup, then hand it to
//! [`Server::serve`](crate::Server::serve). It is never mutated afterwards.

use std::sync::Arc;

use crate::handler::Handler;
use crate::method::Method;
use crate::route::{self, Route};

/// The application router.
///
/// Each registration call returns `self`, so routes chain naturally:
///
/// ```rust
/// # use kettle::{Method, Request, Response, Router};
/// # async fn root(_: Request) -> Response { Response::text("") }
/// # async fn echo(_: Request) -> Response { Response::text("") }
/// # async fn upload(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .get("/",                  root)
///     .get("/echo/{str}",        echo)
///     .on(Method::Post, "/files/{filename}", upload);
/// ```
pub struct Router {
    routes: Vec<(Route, Arc<dyn Handler>)>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a handler for a method + pattern pair.
    ///
    /// Pattern parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if the exact same method and pattern were already registered.
    pub fn on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        let route = Route::new(method, pattern);
        if self.routes.iter().any(|(r, _)| *r == route) {
            panic!("duplicate route `{route}`");
        }
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.routes.push((route, handler));
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, pattern, handler)
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(|(r, _)| r)
    }

    /// First route matching `method` + `target`, if any.
    pub fn find_route(&self, method: Method, target: &str) -> Option<&Route> {
        route::find(self.routes(), method, target)
    }

    pub(crate) fn handler(&self, route: &Route) -> Option<Arc<dyn Handler>> {
        self.routes.iter()
            .find(|(r, _)| r == route)
            .map(|(_, h)| Arc::clone(h))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::status::Status;

    async fn ok(_req: Request) -> Status {
        Status::Ok
    }

    async fn created(_req: Request) -> Status {
        Status::Created
    }

    #[test]
    fn keeps_registration_order() {
        let router = Router::new()
            .get("/", ok)
            .get("/echo/{str}", ok)
            .post("/files/{filename}", created);
        let patterns: Vec<_> = router.routes().map(|r| r.to_string()).collect();
        assert_eq!(patterns, ["GET /", "GET /echo/{str}", "POST /files/{filename}"]);
    }

    #[test]
    fn method_shortcuts_register_their_method() {
        let router = Router::new()
            .put("/files/{filename}", ok)
            .delete("/files/{filename}", ok)
            .patch("/files/{filename}", ok);
        for method in [Method::Put, Method::Delete, Method::Patch] {
            let route = router.find_route(method, "/files/a.txt").unwrap();
            assert_eq!(route.method(), method);
        }
        assert!(router.find_route(Method::Get, "/files/a.txt").is_none());
    }

    #[test]
    fn unmatched_lookup_is_none() {
        let router = Router::new().get("/", ok);
        assert!(router.find_route(Method::Get, "/missing").is_none());
        assert!(router.find_route(Method::Post, "/").is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate route")]
    fn rejects_duplicate_registration() {
        let _ = Router::new().get("/a", ok).get("/a", created);
    }

    #[tokio::test]
    async fn handler_is_bound_to_its_route() {
        let router = Router::new()
            .get("/files/{filename}", ok)
            .post("/files/{filename}", created);
        let route = router.find_route(Method::Post, "/files/a.txt").unwrap().clone();
        let handler = router.handler(&route).unwrap();
        assert_eq!(handler.dispatch(Request::default()).await.get_status(), Status::Created);
    }
}
