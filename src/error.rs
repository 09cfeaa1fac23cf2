//! Unified error type.

use thiserror::Error;

/// The error type returned by showboard's fallible operations.
///
/// Expected client-facing failures (bad parameters, failed validation) are
/// expressed as [`HttpResult`](crate::HttpResult) values, not as `Error`s.
/// This type surfaces the rest: infrastructure failures (binding a port,
/// accepting a connection), data-layer failures during commit, and invariant
/// violations that indicate a programming error rather than a runtime fault.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The persistence layer refused or failed a commit.
    #[error("data layer: {0}")]
    Data(String),

    /// A contract the dispatch core relies on was broken by caller code.
    /// Surfaced to the client as a generic internal error, never as a panic.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Unexpected failure inside a route's `handle`.
    #[error("{0}")]
    Route(String),
}

impl Error {
    /// Shorthand for route-handler failures built from display-able causes.
    pub fn route(cause: impl std::fmt::Display) -> Self {
        Self::Route(cause.to_string())
    }
}
