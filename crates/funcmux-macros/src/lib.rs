//! Derive macros for funcmux.
//!
//! Handler parameters and results describe themselves through the
//! `Input`/`Output` traits in `funcmux-core`. These derives write those
//! implementations:
//!
//! - `#[derive(QueryParam)]` for `FooQueryParam(String)` / `FooQueryParam(i64)`
//!   newtypes read from the query string
//! - `#[derive(Payload)]` for serde types carried as the JSON body
//! - `#[derive(Extractor)]` for types implementing `FromRequest`
//! - `#[derive(Responder)]` for types implementing `ToResponse`
//!
//! Generated code refers to `::funcmux`, so the derives are used through the
//! facade crate.
//!
//! # Example
//!
//! ```ignore
//! use funcmux::prelude::*;
//!
//! #[derive(QueryParam)]
//! struct PageSizeQueryParam(i64);
//!
//! #[derive(Serialize, Payload)]
//! #[payload(encode)]
//! struct Page {
//!     items: Vec<String>,
//! }
//!
//! async fn list(size: Option<PageSizeQueryParam>) -> Page {
//!     // ...
//! }
//! ```

use proc_macro::TokenStream;

mod common;
mod custom;
mod payload;
mod query_param;

/// Derive `Input` for a query parameter newtype.
///
/// The type name must end in `QueryParam`; the parameter key is the rest of
/// the name in snake_case. The single field must be a `String` or a
/// primitive integer.
///
/// # Example
///
/// ```ignore
/// #[derive(QueryParam)]
/// struct UserIdQueryParam(String); // ?user_id=...
/// ```
#[proc_macro_derive(QueryParam)]
pub fn derive_query_param(input: TokenStream) -> TokenStream {
    query_param::derive_query_param_impl(input)
}

/// Derive `Input` and `Output` for a JSON body type.
///
/// The type must also implement `serde::Deserialize` (decoding) and
/// `serde::Serialize` (encoding). Restrict to one direction with
/// `#[payload(decode)]` or `#[payload(encode)]`.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Payload)]
/// struct CreateUser {
///     name: String,
/// }
/// ```
#[proc_macro_derive(Payload, attributes(payload))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    payload::derive_payload_impl(input)
}

/// Derive `Input` for a type that populates itself via `FromRequest`.
#[proc_macro_derive(Extractor)]
pub fn derive_extractor(input: TokenStream) -> TokenStream {
    custom::derive_extractor_impl(input)
}

/// Derive `Output` for a type that renders itself via `ToResponse`.
#[proc_macro_derive(Responder)]
pub fn derive_responder(input: TokenStream) -> TokenStream {
    custom::derive_responder_impl(input)
}
