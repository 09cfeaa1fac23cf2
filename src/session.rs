//! Per-request session context.
//!
//! One [`Session`] exists per inbound request and is threaded explicitly
//! through `validate`, middleware, and `handle` — never ambient state. It
//! bundles the read-only HTTP snapshot, the routing decision, and the
//! request's exclusive data-layer handle. The sibling [`Response`] builder
//! is owned by the dispatcher and passed alongside, mirroring the two
//! arguments every route method takes.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use tracing::error;

use crate::data::DataLayer;
use crate::error::Error;
use crate::middleware::MiddlewareRegistry;
use crate::result::HttpResult;
use crate::route::Route;

// ── HttpInfo ─────────────────────────────────────────────────────────────────

/// Read-only snapshot of one parsed HTTP request.
#[derive(Debug)]
pub struct HttpInfo {
    pub method: Method,
    /// Request path with the leading slash stripped: `show/image`.
    pub path: String,
    pub headers: HeaderMap,
    /// Percent-decoded query parameters. Last occurrence of a key wins.
    pub query: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpInfo {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        query: HashMap<String, String>,
        body: Bytes,
    ) -> Self {
        Self { method, path: path.into(), headers, query, body }
    }

    /// Parses a request line's path and query into a snapshot.
    pub fn from_uri(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let path = uri.path().trim_start_matches('/').to_owned();
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self::new(method, path, headers, query, body)
    }

    /// Collects the body and parses an inbound hyper request.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self, Error> {
        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .to_bytes();
        Ok(Self::from_uri(parts.method, &parts.uri, parts.headers, body))
    }

    /// Path split on `/`, ready for [`Router::resolve`](crate::Router::resolve).
    pub fn path_parts(&self) -> Vec<&str> {
        self.path.split('/').collect()
    }
}

// ── RoutingInfo ──────────────────────────────────────────────────────────────

/// The dispatch decision for this request.
#[derive(Clone)]
pub struct RoutingInfo {
    /// The route the router resolved for this request's path.
    pub route: Arc<dyn Route>,
    /// Middleware names requested during `validate`, in request order.
    pub requested: Vec<String>,
}

// ── Session ──────────────────────────────────────────────────────────────────

/// Everything one request carries through the pipeline.
///
/// Constructed by the dispatcher after route resolution, destroyed when the
/// response goes out. Never shared across requests.
pub struct Session {
    pub http: HttpInfo,
    pub routing: RoutingInfo,
    /// This request's exclusive persistence handle. Committed by the
    /// dispatcher after `handle` returns.
    pub data: Box<dyn DataLayer>,
    registry: Arc<MiddlewareRegistry>,
}

impl Session {
    pub fn new(
        http: HttpInfo,
        route: Arc<dyn Route>,
        data: Box<dyn DataLayer>,
        registry: Arc<MiddlewareRegistry>,
    ) -> Self {
        Self {
            http,
            routing: RoutingInfo { route, requested: Vec::new() },
            data,
            registry,
        }
    }

    /// Requests a middleware check by name from inside `validate`.
    ///
    /// The name is recorded on [`RoutingInfo::requested`] and the check runs
    /// immediately; callers short-circuit on a non-`Ok` result so requested
    /// checks AND together in request order. An unknown name is a
    /// programming error and comes back as an internal-class result.
    pub fn middleware(&mut self, name: &str) -> HttpResult {
        self.routing.requested.push(name.to_owned());
        let Some(mw) = self.registry.get(name) else {
            error!(name, "middleware not registered");
            return HttpResult::internal(format!("Unknown middleware `{name}`"));
        };
        mw.apply(self)
    }

    /// Convenience accessor for a single query parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.http.query.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NullData;
    use crate::route::tests::NoopRoute;

    fn session_with(registry: MiddlewareRegistry) -> Session {
        let http = HttpInfo::from_uri(
            Method::GET,
            &"/status?id=42&id=43&name=a%20b".parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        );
        Session::new(http, Arc::new(NoopRoute), Box::new(NullData), Arc::new(registry))
    }

    #[test]
    fn query_parameters_are_decoded_and_last_wins() {
        let sess = session_with(MiddlewareRegistry::new());
        assert_eq!(sess.query("id"), Some("43"));
        assert_eq!(sess.query("name"), Some("a b"));
        assert_eq!(sess.query("missing"), None);
        assert_eq!(sess.http.path, "status");
    }

    #[test]
    fn middleware_requests_are_recorded_in_order() {
        let registry = MiddlewareRegistry::with_defaults()
            .register("deny", |_: &Session| HttpResult::bad_request("denied"));
        let mut sess = session_with(registry);

        assert_eq!(sess.middleware("db"), HttpResult::ok());
        assert!(sess.middleware("deny").is_error());
        assert_eq!(sess.routing.requested, vec!["db", "deny"]);
    }

    #[test]
    fn unknown_middleware_is_an_internal_class_failure() {
        let mut sess = session_with(MiddlewareRegistry::new());
        let result = sess.middleware("nope");
        assert!(matches!(result, HttpResult::Internal { .. }));
        assert_eq!(sess.routing.requested, vec!["nope"]);
    }

    #[test]
    fn db_middleware_fails_closed_when_data_layer_disabled() {
        struct DisabledData;
        impl DataLayer for DisabledData {
            fn is_enabled(&self) -> bool {
                false
            }
            fn commit(&mut self) -> Result<(), Error> {
                Ok(())
            }
        }

        let mut sess = session_with(MiddlewareRegistry::with_defaults());
        sess.data = Box::new(DisabledData);
        assert!(matches!(sess.middleware("db"), HttpResult::Internal { .. }));
    }
}
