//! The request handler abstraction.
//!
//! Everything that can answer a request implements [`Handler`]: adapted
//! functions, per-method tables, the mux itself and hand-written raw
//! handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::request::Request;
use crate::response::Response;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for request handlers.
///
/// ```ignore
/// struct Health;
///
/// impl Handler for Health {
///     fn call<'a>(&'a self, _ctx: &'a RequestContext, _req: &'a mut Request) -> BoxFuture<'a, Response> {
///         Box::pin(async { Response::ok() })
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// Handle a request and return a response.
    fn call<'a>(&'a self, ctx: &'a RequestContext, req: &'a mut Request)
    -> BoxFuture<'a, Response>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        req: &'a mut Request,
    ) -> BoxFuture<'a, Response> {
        (**self).call(ctx, req)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        req: &'a mut Request,
    ) -> BoxFuture<'a, Response> {
        (**self).call(ctx, req)
    }
}
