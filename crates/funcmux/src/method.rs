//! Per-method dispatch.
//!
//! A [`ByMethod`] collects up to one function for each of GET, POST, PUT,
//! PATCH, DELETE and OPTIONS. Registering it adapts every populated slot
//! into a [`MethodTable`], which answers other methods with 405.

use std::fmt;
use std::sync::Arc;

use funcmux_core::{
    BoxFuture, Handler, HttpError, Inputs, Method, Request, RequestContext, Response,
    ResponseWriter, boxed,
};
use funcmux_router::AllowedMethods;

use crate::adaptor::{HandlerFn, write_error};
use crate::classify::{ClassifyError, Signature};
use crate::registry::AdaptorRegistry;

const SLOTS: [Method; 6] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
    Method::Options,
];

type Adapter =
    Box<dyn FnOnce(&AdaptorRegistry, bool) -> Result<Bound, ClassifyError> + Send + 'static>;

struct Bound {
    handler: Arc<dyn Handler>,
    signature: Arc<Signature>,
}

/// Builder for a route that serves different functions per method.
///
/// ```ignore
/// mux.handle(
///     "/user/:id",
///     ByMethod::new().get(get_user).put(update_user),
///     &["User by id"],
/// )?;
/// ```
#[derive(Default)]
pub struct ByMethod {
    slots: [Option<Adapter>; 6],
}

impl ByMethod {
    /// Create a builder with no slots populated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve GET with `handler`.
    #[must_use]
    pub fn get<H: HandlerFn<Args>, Args: Inputs>(self, handler: H) -> Self {
        self.slot(0, handler)
    }

    /// Serve POST with `handler`.
    #[must_use]
    pub fn post<H: HandlerFn<Args>, Args: Inputs>(self, handler: H) -> Self {
        self.slot(1, handler)
    }

    /// Serve PUT with `handler`.
    #[must_use]
    pub fn put<H: HandlerFn<Args>, Args: Inputs>(self, handler: H) -> Self {
        self.slot(2, handler)
    }

    /// Serve PATCH with `handler`.
    #[must_use]
    pub fn patch<H: HandlerFn<Args>, Args: Inputs>(self, handler: H) -> Self {
        self.slot(3, handler)
    }

    /// Serve DELETE with `handler`.
    #[must_use]
    pub fn delete<H: HandlerFn<Args>, Args: Inputs>(self, handler: H) -> Self {
        self.slot(4, handler)
    }

    /// Serve OPTIONS with `handler`.
    #[must_use]
    pub fn options<H: HandlerFn<Args>, Args: Inputs>(self, handler: H) -> Self {
        self.slot(5, handler)
    }

    /// Methods with a populated slot.
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        SLOTS
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.is_some())
            .map(|(method, _)| *method)
            .collect()
    }

    fn slot<H: HandlerFn<Args>, Args: Inputs>(mut self, idx: usize, handler: H) -> Self {
        self.slots[idx] = Some(Box::new(move |registry: &AdaptorRegistry, debug: bool| {
            let adapted = registry.adapt::<H, Args>(handler)?.with_debug(debug);
            let signature = Arc::clone(adapted.signature());
            Ok(Bound {
                handler: Arc::new(adapted),
                signature,
            })
        }));
        self
    }

    /// Adapt every populated slot.
    ///
    /// # Errors
    ///
    /// The first classification failure.
    pub fn adapt(
        self,
        registry: &AdaptorRegistry,
        debug: bool,
    ) -> Result<MethodTable, ClassifyError> {
        let mut entries = Vec::new();
        for (method, slot) in SLOTS.into_iter().zip(self.slots) {
            if let Some(adapter) = slot {
                entries.push((method, adapter(registry, debug)?));
            }
        }
        let allowed = AllowedMethods::new(entries.iter().map(|(m, _)| *m).collect());
        Ok(MethodTable {
            entries,
            allowed,
            debug,
        })
    }
}

impl fmt::Debug for ByMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByMethod")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Adapted per-method handlers for one route.
pub struct MethodTable {
    entries: Vec<(Method, Bound)>,
    allowed: AllowedMethods,
    debug: bool,
}

impl MethodTable {
    /// Methods this table serves.
    #[must_use]
    pub fn allowed(&self) -> &AllowedMethods {
        &self.allowed
    }

    /// Signature of the function serving `method`.
    #[must_use]
    pub fn signature(&self, method: Method) -> Option<&Arc<Signature>> {
        self.entries
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, bound)| &bound.signature)
    }

    /// `(method, signature)` for every served method.
    pub fn signatures(&self) -> impl Iterator<Item = (Method, &Arc<Signature>)> {
        self.entries.iter().map(|(m, bound)| (*m, &bound.signature))
    }

    fn not_allowed(&self, req: &Request) -> Response {
        let expected = if self.allowed.is_empty() {
            "<none>".to_string()
        } else {
            self.allowed.header_value()
        };
        let err = HttpError::method_not_allowed()
            .with_detail(format!(
                "method {} not allowed, expected {{{expected}}}",
                req.method()
            ))
            .with_header("allow", self.allowed.header_value());
        let mut res = ResponseWriter::new();
        write_error(&mut res, &boxed(err), req, self.debug);
        res.finish()
    }
}

impl Handler for MethodTable {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        req: &'a mut Request,
    ) -> BoxFuture<'a, Response> {
        let method = req.method();
        match self.entries.iter().find(|(m, _)| *m == method) {
            Some((_, bound)) => bound.handler.call(ctx, req),
            None => {
                let res = self.not_allowed(req);
                Box::pin(async move { res })
            }
        }
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}
