//! Core types and traits for funcmux.
//!
//! This crate provides the building blocks the router and the adaptor share:
//! - [`Request`], [`Response`] and the incremental [`ResponseWriter`]
//! - [`RequestContext`] wrapping asupersync's [`Cx`](asupersync::Cx)
//! - the [`ResponseError`] taxonomy and [`HttpError`]
//! - the type-description model ([`TypeDesc`], [`Shape`], [`Capabilities`])
//! - conversion traits ([`Input`], [`Output`], [`FromRequest`], [`ToResponse`])
//! - the [`Handler`] trait and an in-process [`TestClient`]
//!
//! # Design Principles
//!
//! - No runtime reflection: types describe themselves through traits
//! - All types support `Send + Sync`
//! - Request-time failures are values, never panics

#![forbid(unsafe_code)]

pub mod codec;
mod context;
pub mod convert;
mod describe;
pub mod error;
mod handler;
mod query;
mod request;
mod response;
pub mod testing;

pub use context::{BodyLimitConfig, CancelledError, DEFAULT_MAX_BODY_SIZE, RequestContext};
pub use convert::{
    FromRequest, Input, InputSource, Inputs, IntoBoxError, Json, Output, OutputRole, OutputSlot,
    Outputs, QueryValue, Render, ToResponse,
};
pub use describe::{Capabilities, Shape, TypeDesc, short_type_name};
pub use error::{BoxError, HttpError, ResponseError, boxed};
pub use handler::{BoxFuture, Handler};
pub use query::{QueryParams, percent_decode, percent_decode_path};
pub use request::{Body, Headers, Method, Request};
pub use response::{Response, ResponseBody, ResponseWriter, StatusCode};

pub use asupersync::Cx;

pub use testing::{RequestBuilder, TestClient, TestResponse};
