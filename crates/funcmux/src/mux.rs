//! The request multiplexer.
//!
//! [`ServeMux`] ties the router, the adaptor registry and the configuration
//! together. Functions are adapted when they are registered, so a malformed
//! signature or a conflicting pattern is reported by [`ServeMux::handle`]
//! rather than at request time.
//!
//! # Example
//!
//! ```ignore
//! use funcmux::prelude::*;
//!
//! let mux = ServeMux::new();
//! mux.handle("/user/:id", ByMethod::new().get(get_user).put(put_user), &["Users"])?;
//! mux.handle("/health", health, &[])?;
//!
//! let client = TestClient::new(mux);
//! assert_eq!(client.get("/health").send().status_code(), 200);
//! ```

use std::fmt;
use std::sync::Arc;

use funcmux_core::{
    BoxFuture, Handler, HttpError, Inputs, Method, QueryParams, Request, RequestContext,
    Response, ResponseWriter, boxed,
};
use funcmux_router::{RouteError, Router};
use parking_lot::RwLock;
use thiserror::Error;

use crate::adaptor::{Adapted, HandlerFn, write_error};
use crate::classify::{ClassifyError, Signature};
use crate::config::MuxConfig;
use crate::method::{ByMethod, MethodTable};
use crate::registry::AdaptorRegistry;

/// Route registration failure.
#[derive(Debug, Error)]
pub enum MuxError {
    /// The pattern could not be added to the router.
    #[error(transparent)]
    Route(#[from] RouteError),
    /// A function's signature could not be classified.
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// A hand-written [`Handler`] bound as-is, without adaptation.
#[derive(Debug, Clone)]
pub struct Raw<H>(pub H);

/// What a route is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
    /// One function serving every method.
    Any(Arc<Signature>),
    /// One function per method.
    Methods(Vec<(Method, Arc<Signature>)>),
    /// A raw handler.
    Raw,
}

impl Binding {
    fn kind(&self) -> &'static str {
        match self {
            Self::Any(_) => "function",
            Self::Methods(_) => "methods",
            Self::Raw => "raw",
        }
    }
}

/// A routed handler with its binding description.
pub struct Endpoint {
    handler: Arc<dyn Handler>,
    binding: Binding,
}

impl Endpoint {
    /// The binding description.
    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Things [`ServeMux::handle`] accepts: async functions, [`ByMethod`]
/// tables and [`Raw`] handlers.
///
/// `M` only disambiguates the implementations.
pub trait IntoEndpoint<M> {
    /// Adapt into an endpoint.
    ///
    /// # Errors
    ///
    /// Classification failures.
    fn into_endpoint(
        self,
        registry: &AdaptorRegistry,
        config: &MuxConfig,
    ) -> Result<Endpoint, ClassifyError>;
}

#[doc(hidden)]
pub struct FnMarker;
#[doc(hidden)]
pub struct MethodsMarker;
#[doc(hidden)]
pub struct RawMarker;

impl<H, Args> IntoEndpoint<(FnMarker, Args)> for H
where
    H: HandlerFn<Args>,
    Args: Inputs,
{
    fn into_endpoint(
        self,
        registry: &AdaptorRegistry,
        config: &MuxConfig,
    ) -> Result<Endpoint, ClassifyError> {
        let adapted = registry.adapt::<H, Args>(self)?.with_debug(config.debug);
        let binding = Binding::Any(Arc::clone(adapted.signature()));
        Ok(Endpoint {
            handler: Arc::new(adapted),
            binding,
        })
    }
}

impl IntoEndpoint<MethodsMarker> for ByMethod {
    fn into_endpoint(
        self,
        registry: &AdaptorRegistry,
        config: &MuxConfig,
    ) -> Result<Endpoint, ClassifyError> {
        let table: MethodTable = self.adapt(registry, config.debug)?;
        let binding = Binding::Methods(
            table
                .signatures()
                .map(|(method, sig)| (method, Arc::clone(sig)))
                .collect(),
        );
        Ok(Endpoint {
            handler: Arc::new(table),
            binding,
        })
    }
}

impl<H: Handler + 'static> IntoEndpoint<RawMarker> for Raw<H> {
    fn into_endpoint(
        self,
        _registry: &AdaptorRegistry,
        _config: &MuxConfig,
    ) -> Result<Endpoint, ClassifyError> {
        Ok(Endpoint {
            handler: Arc::new(self.0),
            binding: Binding::Raw,
        })
    }
}

/// Registered route, for documentation tooling.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Canonical pattern.
    pub pattern: String,
    /// Notes given at registration.
    pub notes: Vec<String>,
    /// Methods served; `None` when every method is.
    pub methods: Option<Vec<Method>>,
    /// The binding and its signatures.
    pub binding: Binding,
}

/// Routes requests to adapted functions.
pub struct ServeMux {
    router: RwLock<Router<Arc<Endpoint>>>,
    registry: Arc<AdaptorRegistry>,
    config: MuxConfig,
}

impl Default for ServeMux {
    fn default() -> Self {
        Self::new()
    }
}

impl ServeMux {
    /// Create a mux with default configuration and its own registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MuxConfig::default())
    }

    /// Create a mux with the given configuration and its own registry.
    #[must_use]
    pub fn with_config(config: MuxConfig) -> Self {
        Self {
            router: RwLock::new(Router::new()),
            registry: Arc::new(AdaptorRegistry::new()),
            config,
        }
    }

    /// Share `registry` instead of the mux's own.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<AdaptorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The adaptor registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<AdaptorRegistry> {
        &self.registry
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    /// Bind `endpoint` to `pattern`.
    ///
    /// # Errors
    ///
    /// [`MuxError::Classify`] for an unusable signature and
    /// [`MuxError::Route`] for duplicate or conflicting patterns. Nothing is
    /// registered on error.
    pub fn handle<M>(
        &self,
        pattern: &str,
        endpoint: impl IntoEndpoint<M>,
        notes: &[&str],
    ) -> Result<(), MuxError> {
        let endpoint = endpoint.into_endpoint(&self.registry, &self.config)?;
        let kind = endpoint.binding.kind();
        self.router
            .write()
            .register(pattern, Arc::new(endpoint), notes)?;
        tracing::info!(mux = %self.config.name, pattern, binding = kind, "route registered");
        Ok(())
    }

    /// Adapt a function without routing it.
    ///
    /// # Errors
    ///
    /// Classification failures.
    pub fn adapt<H, Args>(&self, handler: H) -> Result<Adapted<H, Args>, MuxError>
    where
        H: HandlerFn<Args>,
        Args: Inputs,
    {
        Ok(self
            .registry
            .adapt::<H, Args>(handler)?
            .with_debug(self.config.debug))
    }

    /// Every registered route.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.router
            .read()
            .routes()
            .into_iter()
            .map(|entry| RouteInfo {
                pattern: entry.pattern,
                notes: entry.notes.to_vec(),
                methods: match &entry.endpoint.binding {
                    Binding::Methods(methods) => Some(methods.iter().map(|(m, _)| *m).collect()),
                    Binding::Any(_) | Binding::Raw => None,
                },
                binding: entry.endpoint.binding.clone(),
            })
            .collect()
    }

    fn not_found(&self, req: &Request) -> Response {
        let err = HttpError::not_found().with_detail(format!("not found {}", req.path()));
        let mut res = ResponseWriter::new();
        write_error(&mut res, &boxed(err), req, self.config.debug);
        res.finish()
    }
}

impl Handler for ServeMux {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        req: &'a mut Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut params = QueryParams::new();
            let found = self.router.read().resolve(req.path(), &mut params).map(Arc::clone);

            let Some(endpoint) = found else {
                return self.not_found(req);
            };
            req.extend_path_params(params);

            let scoped = RequestContext::with_body_limit(
                ctx.cx().clone(),
                ctx.request_id(),
                self.config.max_body_size,
            );
            endpoint.handler.call(&scoped, req).await
        })
    }
}

impl fmt::Debug for ServeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeMux")
            .field("config", &self.config)
            .field("routes", &self.router.read().len())
            .field("registry", &self.registry.stats())
            .finish()
    }
}
