//! Segment trie router.
//!
//! Maps `/`-separated path patterns with `:name` variables to endpoints.
//!
//! # Features
//!
//! - Literal segments take precedence over variables at every level
//! - Backtracking: a literal branch that dead-ends falls back to the
//!   variable branch
//! - Captured variables are appended to the request's query parameters
//! - Notes stored per route for documentation tooling

#![forbid(unsafe_code)]

mod error;
mod r#match;
mod trie;

pub use error::RouteError;
pub use r#match::{AllowedMethods, RouteEntry, RouteMatch};
pub use trie::{Router, split_segments};
