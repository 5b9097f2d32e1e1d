//! Route registration errors.

use thiserror::Error;

/// A pattern could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern's terminal node already has an endpoint.
    #[error("duplicate route for path {pattern}")]
    DuplicateRoute {
        /// The rejected pattern.
        pattern: String,
    },
    /// A segment was a bare `:`.
    #[error("empty variable name in path {pattern}")]
    EmptyVariableName {
        /// The rejected pattern.
        pattern: String,
    },
    /// A different variable name is already registered at the same position.
    #[error(
        "conflicting variable ':{requested}' in path {pattern}: ':{existing}' is already registered at that position"
    )]
    ConflictingVariable {
        /// The rejected pattern.
        pattern: String,
        /// Name already in the trie.
        existing: String,
        /// Name the pattern asked for.
        requested: String,
    },
}
