//! Route plain async Rust functions as HTTP handlers.
//!
//! funcmux looks at a function's parameter and return types and builds the
//! glue that decodes a request into arguments and writes the results back:
//!
//! - **Query parameters**: `*QueryParam` newtypes over `String` or an integer,
//!   required unless wrapped in `Option`
//! - **Custom extraction**: types implementing [`FromRequest`]
//! - **Request body**: anything else, decoded as JSON (at most one)
//! - **Custom rendering**: types implementing [`ToResponse`], run in order
//! - **Response body**: encoded as JSON, always written last
//! - **Errors**: `Result::Err` or a trailing `Option<E>`, sent as
//!   `{"error": "..."}` with the error's status
//!
//! Paths are matched by a segment trie; `:name` segments capture into the
//! query collection, so a `UserIdQueryParam` parameter reads `/user/:user_id`.
//!
//! # Quick Start
//!
//! ```ignore
//! use funcmux::prelude::*;
//!
//! #[derive(QueryParam)]
//! struct IdQueryParam(String);
//!
//! #[derive(Serialize, Payload)]
//! #[payload(encode)]
//! struct User {
//!     id: String,
//! }
//!
//! async fn get_user(id: IdQueryParam) -> Result<User, HttpError> {
//!     Ok(User { id: id.0 })
//! }
//!
//! let mux = ServeMux::new();
//! mux.handle("/user/:id", ByMethod::new().get(get_user), &["Fetch a user"])?;
//! ```
//!
//! # Crate Structure
//!
//! - [`funcmux_core`]: request/response model, conversion traits, errors
//! - [`funcmux_router`]: segment trie
//! - [`funcmux_macros`]: `QueryParam`, `Payload`, `Extractor`, `Responder`
//!   derives

#![forbid(unsafe_code)]

extern crate self as funcmux;

pub mod adaptor;
pub mod classify;
mod config;
pub mod logging;
pub mod method;
pub mod mux;
pub mod registry;

// Re-export crates
pub use funcmux_core as core;
pub use funcmux_router as router;

#[doc(hidden)]
pub use serde as __serde;

pub use adaptor::{Adapted, HandlerFn};
pub use classify::{
    ClassifyError, InputConverter, InputRole, OutputConverter, QueryKind, Signature,
};
pub use config::MuxConfig;
pub use method::{ByMethod, MethodTable};
pub use mux::{Binding, Endpoint, IntoEndpoint, MuxError, Raw, RouteInfo, ServeMux};
pub use registry::{AdaptorRegistry, Origin, RegistryEntry, RegistryStats, SignatureKey};

pub use funcmux_core::{
    BoxError, BoxFuture, FromRequest, Handler, HttpError, Json, Method, OutputRole, Request,
    RequestContext, Response, ResponseError, ResponseWriter, StatusCode, ToResponse,
};
pub use funcmux_macros::{Extractor, Payload, QueryParam, Responder};
pub use funcmux_router::RouteError;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        ByMethod, Extractor, FromRequest, Handler, HttpError, Json, Method, MuxConfig, MuxError,
        Payload, QueryParam, Raw, Request, RequestContext, Responder, Response, ResponseError,
        ResponseWriter, ServeMux, StatusCode, ToResponse,
    };
    pub use serde::{Deserialize, Serialize};
}

/// Testing utilities module.
pub mod testing {
    pub use funcmux_core::testing::{RequestBuilder, TestClient, TestResponse};
}
