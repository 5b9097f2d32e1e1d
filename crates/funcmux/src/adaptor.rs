//! Request/response adaptor.
//!
//! [`Adapted`] executes a [`Signature`] against a plain async function:
//!
//! 1. **Input phase**: each parameter is decoded from the source its
//!    converter names, in declared order, stopping at the first failure.
//! 2. **Invocation**: the function is awaited with the decoded arguments.
//! 3. **Output phase**: a non-empty error in the last position is rendered
//!    alone. Otherwise custom outputs render in declared order and the body
//!    output is encoded last.
//!
//! Failures become responses through the error taxonomy: errors with a
//! status are sent as `{"error": "<message>"}`; errors without one are
//! logged and answered with a 500. Nothing already written is retracted.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use funcmux_core::codec;
use funcmux_core::{
    BoxError, BoxFuture, Handler, HttpError, Input, InputSource, Inputs, OutputRole, OutputSlot,
    Outputs, QueryParams, QueryValue, Request, RequestContext, Response, ResponseWriter,
    StatusCode, boxed, convert,
};

use crate::classify::{InputConverter, InputRole, QueryKind, Signature};

/// An async function usable as a handler.
///
/// Implemented for every `Fn(A, B, ..) -> impl Future` with up to eight
/// parameters, each implementing [`Input`], whose future resolves to an
/// [`Outputs`] value.
pub trait HandlerFn<Args>: Send + Sync + 'static {
    /// The function's return type.
    type Output: Outputs;
    /// The future returned by a call.
    type Future: Future<Output = Self::Output> + Send;

    /// Call with a decoded argument tuple.
    fn call(&self, args: Args) -> Self::Future;
}

macro_rules! handler_fn {
    ($($ty:ident),*) => {
        impl<F, Fut, $($ty,)*> HandlerFn<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future + Send,
            Fut::Output: Outputs,
            $($ty: Input,)*
        {
            type Output = Fut::Output;
            type Future = Fut;

            #[allow(non_snake_case)]
            fn call(&self, args: ($($ty,)*)) -> Fut {
                let ($($ty,)*) = args;
                (self)($($ty),*)
            }
        }
    };
}

handler_fn!();
handler_fn!(A);
handler_fn!(A, B);
handler_fn!(A, B, C);
handler_fn!(A, B, C, D);
handler_fn!(A, B, C, D, E);
handler_fn!(A, B, C, D, E, F1);
handler_fn!(A, B, C, D, E, F1, G);
handler_fn!(A, B, C, D, E, F1, G, H);

/// A function bound to its signature, ready to serve requests.
pub struct Adapted<H, Args> {
    handler: H,
    signature: Arc<Signature>,
    roles: Vec<OutputRole>,
    debug: bool,
    _args: PhantomData<fn() -> Args>,
}

impl<H, Args> Adapted<H, Args>
where
    H: HandlerFn<Args>,
    Args: Inputs,
{
    /// Bind `handler` to an already classified signature.
    #[must_use]
    pub fn new(handler: H, signature: Arc<Signature>) -> Self {
        let roles = signature.output_roles();
        Self {
            handler,
            signature,
            roles,
            debug: false,
            _args: PhantomData,
        }
    }

    /// Include internal error messages in 500 responses.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The plan this adaptor runs.
    #[must_use]
    pub fn signature(&self) -> &Arc<Signature> {
        &self.signature
    }

    fn decode_inputs(&self, ctx: &RequestContext, req: &Request) -> Result<Args, BoxError> {
        let query = if self.signature.uses_query() {
            req.query_params()
        } else {
            QueryParams::new()
        };
        let sources = self
            .signature
            .inputs()
            .iter()
            .map(|converter| input_source(converter, ctx, req, &query));
        Args::decode(sources)
    }

    fn write_outputs(&self, output: H::Output, res: &mut ResponseWriter, req: &Request) {
        let mut slots = output.into_slots(&self.roles);

        if self.signature.last_is_error() {
            if let Some(OutputSlot::Error(Some(_))) = slots.last() {
                if let Some(OutputSlot::Error(Some(err))) = slots.pop() {
                    write_error(res, &err, req, self.debug);
                }
                return;
            }
        }

        let mut body = None;
        for (idx, slot) in slots.into_iter().enumerate() {
            match slot {
                OutputSlot::Render(render) if Some(idx) == self.signature.response_body() => {
                    body = Some(render);
                }
                OutputSlot::Render(render) => {
                    if let Err(err) = render.render(res) {
                        write_error(res, &err, req, self.debug);
                        return;
                    }
                }
                OutputSlot::Error(_) | OutputSlot::Skip => {}
            }
        }

        if let Some(body) = body {
            if let Err(err) = body.render(res) {
                write_error(res, &err, req, self.debug);
            }
        }
    }
}

impl<H, Args> Handler for Adapted<H, Args>
where
    H: HandlerFn<Args>,
    Args: Inputs,
{
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        req: &'a mut Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut res = ResponseWriter::new();
            let args = match self.decode_inputs(ctx, req) {
                Ok(args) => args,
                Err(err) => {
                    write_error(&mut res, &err, req, self.debug);
                    return res.finish();
                }
            };

            let output = self.handler.call(args).await;
            self.write_outputs(output, &mut res, req);
            res.finish()
        })
    }
}

impl<H, Args> std::fmt::Debug for Adapted<H, Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapted")
            .field("handler", &std::any::type_name::<H>())
            .field("signature", &self.signature)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

fn input_source<'a>(
    converter: &'a InputConverter,
    ctx: &'a RequestContext,
    req: &'a Request,
    query: &'a QueryParams,
) -> Result<InputSource<'a>, BoxError> {
    match converter.role {
        InputRole::Body => {
            let bytes = req.body().as_bytes();
            let limit = ctx.max_body_size();
            if bytes.len() > limit {
                return Err(boxed(
                    HttpError::payload_too_large()
                        .with_detail(format!("request body exceeds {limit} bytes")),
                ));
            }
            Ok(InputSource::Body(bytes))
        }
        InputRole::Custom => Ok(InputSource::Request { ctx, req }),
        InputRole::Query(kind) => {
            let name = converter.name.as_deref().unwrap_or_default();
            let value = match (query.get(name), kind) {
                (None, _) => None,
                (Some(text), QueryKind::Str) => Some(QueryValue::Str(text)),
                (Some(text), QueryKind::Int) => Some(QueryValue::Int(
                    text.parse::<i64>().map_err(|_| convert::not_integer(name))?,
                )),
            };
            Ok(InputSource::Query { name, value })
        }
    }
}

/// Render `err` into `res` through the error taxonomy.
///
/// When the head is still open the error's status and headers are written;
/// afterwards only its JSON body is appended.
pub(crate) fn write_error(res: &mut ResponseWriter, err: &BoxError, req: &Request, debug: bool) {
    let (status, message) = match err.status() {
        Some(status) => (status, err.to_string()),
        None => {
            tracing::error!(
                method = %req.method(),
                path = req.path(),
                error = %err,
                "handler failed"
            );
            let message = if debug {
                err.to_string()
            } else {
                "internal server error".to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    };

    if !res.is_committed() {
        for (name, value) in err.headers() {
            res.append_header(name.clone(), value.clone());
        }
        res.set_header("content-type", codec::CONTENT_TYPE);
        res.write_status(status);
    }
    res.write(&codec::error_body(&message));
}
