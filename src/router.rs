//! Exact-match request router.
//!
//! A plain ordered registry of route instances, resolved by exact string
//! comparison against the slash-joined path. No prefix matching, no
//! wildcards, no trailing-slash normalization — callers hand in an already
//! normalized path, and anything that does not match byte-for-byte is a
//! miss the dispatcher maps to 404.

use std::sync::Arc;

use crate::route::Route;

/// The static route registry. Built once at startup, shared read-only
/// across concurrent requests. Each [`Router::register`] call returns
/// `self` so registrations chain naturally.
pub struct Router {
    routes: Vec<Arc<dyn Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route to the registry. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate path — two routes behind one path is a
    /// programming error, caught at startup rather than at request time.
    pub fn register(mut self, route: impl Route + 'static) -> Self {
        let path = route.path();
        if self.routes.iter().any(|r| r.path() == path) {
            panic!("duplicate route `{path}`");
        }
        self.routes.push(Arc::new(route));
        self
    }

    /// Joins `parts` with `/` and looks for an exact match. `None` means no
    /// registered route owns the path; the caller maps that to 404.
    pub fn resolve(&self, parts: &[&str]) -> Option<Arc<dyn Route>> {
        let joined = parts.join("/");
        self.routes.iter().find(|r| r.path() == joined).cloned()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{ModerationRoute, ShowImageRoute, StatusRoute};

    fn registry() -> Router {
        Router::new()
            .register(StatusRoute)
            .register(ShowImageRoute::new("shows"))
            .register(ModerationRoute)
    }

    #[test]
    fn every_registered_route_resolves_to_itself() {
        let router = registry();
        for path in ["status", "show/image", "moderation"] {
            let parts: Vec<&str> = path.split('/').collect();
            let route = router.resolve(&parts).expect(path);
            assert_eq!(route.path(), path);
        }
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let router = registry();
        assert!(router.resolve(&["show"]).is_none());
        assert!(router.resolve(&["show", "image", "extra"]).is_none());
        assert!(router.resolve(&["SHOW", "IMAGE"]).is_none());
        assert!(router.resolve(&[""]).is_none());
    }

    #[test]
    fn matching_is_exact_not_prefix() {
        let router = registry();
        assert!(router.resolve(&["status", ""]).is_none());
        assert!(router.resolve(&["statu"]).is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate route")]
    fn duplicate_path_panics() {
        let _ = Router::new().register(StatusRoute).register(StatusRoute);
    }
}
