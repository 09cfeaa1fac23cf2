//! The two-phase route contract.
//!
//! Every route splits its work into `validate` (pure precondition check,
//! may request middleware, returns an [`HttpResult`]) and `handle` (the
//! actual effect, must emit exactly one terminal response). The split lets
//! method, permission, and parameter failures short-circuit before any
//! mutating effect runs, and it makes both phases testable without I/O.

use async_trait::async_trait;
use http::Method;

use crate::error::Error;
use crate::response::Response;
use crate::result::HttpResult;
use crate::session::Session;

/// A path-addressable handler unit.
///
/// Route instances are constructed once at router build time, never mutated
/// afterwards, and shared read-only across concurrent requests. Per-request
/// state belongs on the [`Session`], never on the route.
#[async_trait]
pub trait Route: Send + Sync {
    /// Slash-joined registry key, without a leading slash: `"show/image"`.
    /// Unique across the router.
    fn path(&self) -> &'static str;

    /// Non-empty set of verbs this route accepts.
    fn allowed_methods(&self) -> Vec<Method>;

    /// True iff the session's method is in [`allowed_methods`](Self::allowed_methods).
    /// On false the dispatcher emits a 405-class error and never calls
    /// `validate` or `handle`.
    fn is_method_ok(&self, sess: &Session) -> bool {
        self.allowed_methods().contains(&sess.http.method)
    }

    /// Precondition check. May request middleware via
    /// [`Session::middleware`] and must short-circuit on the first non-`Ok`
    /// result it sees. No side effects beyond reading session state.
    /// Returns `Ok` only when `handle` is safe to call.
    fn validate(&self, sess: &mut Session, res: &mut Response) -> HttpResult;

    /// Performs the route's effect and emits exactly one terminal response,
    /// or returns an error for the dispatcher to convert into a 500. A
    /// normal return without emission trips the dispatcher's safety net.
    async fn handle(&self, sess: &mut Session, res: &mut Response) -> Result<(), Error>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// GET-only route that accepts everything and emits nothing. Handy as a
    /// placeholder wherever a session needs some resolved route.
    pub(crate) struct NoopRoute;

    #[async_trait]
    impl Route for NoopRoute {
        fn path(&self) -> &'static str {
            "noop"
        }

        fn allowed_methods(&self) -> Vec<Method> {
            vec![Method::GET]
        }

        fn validate(&self, _sess: &mut Session, _res: &mut Response) -> HttpResult {
            HttpResult::ok()
        }

        async fn handle(&self, _sess: &mut Session, _res: &mut Response) -> Result<(), Error> {
            Ok(())
        }
    }
}
