//! Route handler trait.
//!
//! Any `async fn(Request) -> impl IntoResponse` (or closure of that shape)
//! is a [`Handler`]. The trait is object safe, so the router stores every
//! handler as `Arc<dyn Handler>` regardless of its concrete type and each
//! exchange costs one virtual call plus one boxed future.

use std::future::Future;
use std::pin::Pin;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The boxed future a handler returns once its output is converted.
pub type ResponseFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Implemented for every valid route handler.
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Handlers report expected failures (missing argument, unknown file) by
/// returning a 4xx response. A handler that panics takes down only the
/// connection it was serving. The trait is sealed; the blanket impl over
/// `Fn(Request) -> Future` is the only one.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn dispatch(&self, req: Request) -> ResponseFuture;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn dispatch(&self, req: Request) -> ResponseFuture {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
