//! Named middleware checks.
//!
//! A middleware is a reusable precondition a route opts into during
//! `validate` by name — `sess.middleware("db")` — without importing the
//! implementation. The registry maps string keys to shared check functions;
//! it is built once at startup and shared read-only across requests.
//!
//! Middleware only reads session state. Anything it wants to tell the
//! client travels back through the returned [`HttpResult`], which the
//! dispatcher turns into a response.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::result::HttpResult;
use crate::session::Session;

/// A named precondition check.
///
/// Blanket-implemented for plain functions, so a closure registers directly:
///
/// ```rust
/// use showboard::{HttpResult, MiddlewareRegistry, Session};
///
/// let registry = MiddlewareRegistry::new().register("auth", |sess: &Session| {
///     match sess.http.headers.get("authorization") {
///         Some(_) => HttpResult::ok(),
///         None => HttpResult::rejected(http::StatusCode::UNAUTHORIZED, "No token."),
///     }
/// });
/// ```
pub trait Middleware: Send + Sync {
    fn apply(&self, sess: &Session) -> HttpResult;
}

impl<F> Middleware for F
where
    F: Fn(&Session) -> HttpResult + Send + Sync,
{
    fn apply(&self, sess: &Session) -> HttpResult {
        self(sess)
    }
}

/// Mapping from middleware name to check, fixed after startup.
pub struct MiddlewareRegistry {
    entries: HashMap<&'static str, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    /// An empty registry. Most applications want
    /// [`with_defaults`](Self::with_defaults) instead.
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// A registry pre-loaded with the built-in checks: `"db"`.
    pub fn with_defaults() -> Self {
        Self::new().register("db", DatabaseMiddleware)
    }

    /// Registers a check under `name`. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name — two checks behind one key is a
    /// programming error, caught at startup.
    pub fn register(mut self, name: &'static str, mw: impl Middleware + 'static) -> Self {
        if self.entries.insert(name, Arc::new(mw)).is_some() {
            panic!("duplicate middleware `{name}`");
        }
        self
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.entries.get(name).cloned()
    }
}

impl Default for MiddlewareRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Fails a request closed when the session's data layer reports itself
/// disabled. Routes that touch persistence request this as `"db"`.
pub struct DatabaseMiddleware;

impl Middleware for DatabaseMiddleware {
    fn apply(&self, sess: &Session) -> HttpResult {
        if !sess.data.is_enabled() {
            warn!("database was not loaded, cancelling request");
            return HttpResult::internal("Database was not loaded, cancelling request");
        }
        HttpResult::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "duplicate middleware")]
    fn duplicate_name_panics() {
        let _ = MiddlewareRegistry::new()
            .register("db", DatabaseMiddleware)
            .register("db", DatabaseMiddleware);
    }

    #[test]
    fn lookup_finds_registered_checks() {
        let registry = MiddlewareRegistry::with_defaults();
        assert!(registry.get("db").is_some());
        assert!(registry.get("no-such").is_none());
    }
}
