//! Request dispatch orchestration.
//!
//! One request runs through a fixed sequence, never reordered and never
//! parallelized within the request:
//!
//! 1. route resolution — a miss is a 404
//! 2. method check — a miss is a 405 with CORS `all`, `validate`/`handle`
//!    never run
//! 3. `validate`, including any middleware the route requests — a non-`Ok`
//!    result becomes the terminal response with CORS `all`
//! 4. `handle` — an error return is converted into a generic 500; the
//!    failure stays inside this request
//! 5. data commit, then the safety net: a `handle` that returned without
//!    emitting anything is itself an internal error
//!
//! Whatever happens, exactly one terminal response comes out.

use std::sync::Arc;

use http::StatusCode;
use tracing::{error, info};

use crate::app::App;
use crate::response::{Cors, Response};
use crate::result::HttpResult;
use crate::session::{HttpInfo, Session};

/// Runs one parsed request through the pipeline. Always returns an emitted
/// [`Response`]; the caller only has to write it out.
pub async fn dispatch(app: &App, http: HttpInfo) -> Response {
    let mut res = Response::new();

    info!(method = %http.method, path = %http.path, "dispatching request");

    let Some(route) = app.router().resolve(&http.path_parts()) else {
        info!(path = %http.path, "no route for path");
        res.status(StatusCode::NOT_FOUND)
            .cors(Cors::All)
            .error(format!("Unknown route {}", http.path));
        return res;
    };

    let mut sess = Session::new(http, Arc::clone(&route), app.open_data(), app.middleware_registry());

    if !route.is_method_ok(&sess) {
        error!(
            method = %sess.http.method,
            path = route.path(),
            "unsupported method on route"
        );
        res.status(StatusCode::METHOD_NOT_ALLOWED)
            .cors(Cors::All)
            .error(format!("Unsupported method {}", sess.http.method));
        return res;
    }

    info!(path = route.path(), "validating route");
    match route.validate(&mut sess, &mut res) {
        HttpResult::Ok => {}
        HttpResult::BadRequest { status, message } => {
            if !res.is_emitted() {
                res.status(status).cors(Cors::All).error(message);
            }
            return res;
        }
        HttpResult::Internal { message } => {
            if !res.is_emitted() {
                res.internal(message);
            }
            return res;
        }
    }

    info!(path = route.path(), method = %sess.http.method, "starting route");
    if let Err(e) = route.handle(&mut sess, &mut res).await {
        error!("route threw an uncaught error: {e}");
        if !res.is_emitted() {
            res.internal(e);
        }
        return res;
    }

    if let Err(e) = sess.data.commit() {
        error!("data commit failed: {e}");
        if !res.is_emitted() {
            res.internal(e);
            return res;
        }
    }

    // Contract-enforcement safety net, not an expected path.
    if !res.is_emitted() {
        res.internal("No output received from the route");
    }
    res
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use http::{HeaderMap, Method};

    use super::*;
    use crate::data::DataLayer;
    use crate::error::Error;
    use crate::response::ContentType;
    use crate::route::Route;
    use crate::router::Router;
    use crate::routes::{ModerationRoute, ShowImageRoute, StatusRoute};
    use crate::session::Session as Sess;

    fn request(method: Method, path_and_query: &str) -> HttpInfo {
        HttpInfo::from_uri(
            method,
            &path_and_query.parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        )
    }

    // ── Spy plumbing ─────────────────────────────────────────────────────────

    #[derive(Default)]
    struct SpyCounters {
        validate: AtomicUsize,
        handle: AtomicUsize,
    }

    struct SpyRoute {
        counters: Arc<SpyCounters>,
        validate_result: fn() -> HttpResult,
        behavior: Behavior,
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Emit,
        Silent,
        Fail,
    }

    impl SpyRoute {
        fn new(behavior: Behavior) -> (Self, Arc<SpyCounters>) {
            let counters = Arc::new(SpyCounters::default());
            let route = Self {
                counters: Arc::clone(&counters),
                validate_result: HttpResult::ok,
                behavior,
            };
            (route, counters)
        }
    }

    #[async_trait::async_trait]
    impl Route for SpyRoute {
        fn path(&self) -> &'static str {
            "spy"
        }

        fn allowed_methods(&self) -> Vec<Method> {
            vec![Method::GET]
        }

        fn validate(&self, _sess: &mut Sess, _res: &mut Response) -> HttpResult {
            self.counters.validate.fetch_add(1, Ordering::SeqCst);
            (self.validate_result)()
        }

        async fn handle(&self, _sess: &mut Sess, res: &mut Response) -> Result<(), Error> {
            self.counters.handle.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Emit => {
                    res.json(&serde_json::json!({ "spied": true }));
                    Ok(())
                }
                Behavior::Silent => Ok(()),
                Behavior::Fail => Err(Error::route("spy blew up")),
            }
        }
    }

    struct CountingData {
        commits: Arc<AtomicUsize>,
    }

    impl DataLayer for CountingData {
        fn is_enabled(&self) -> bool {
            true
        }
        fn commit(&mut self) -> Result<(), Error> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // ── Scenarios ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_path_is_404() {
        let app = App::new(Router::new().register(StatusRoute));
        let res = dispatch(&app, request(Method::GET, "/no/such/route")).await;
        assert_eq!(res.emitted_status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn wrong_method_short_circuits_before_validate_and_handle() {
        let (spy, counters) = SpyRoute::new(Behavior::Emit);
        let app = App::new(Router::new().register(spy));

        let res = dispatch(&app, request(Method::POST, "/spy")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::METHOD_NOT_ALLOWED));
        assert_eq!(res.cors_policy(), &Cors::All);
        assert_eq!(counters.validate.load(Ordering::SeqCst), 0);
        assert_eq!(counters.handle.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn validate_failure_skips_handle_and_commit() {
        let (mut spy, counters) = SpyRoute::new(Behavior::Emit);
        spy.validate_result = || HttpResult::bad_request("missing field");
        let commits = Arc::new(AtomicUsize::new(0));
        let commits_seen = Arc::clone(&commits);
        let app = App::new(Router::new().register(spy)).data(move || {
            Box::new(CountingData { commits: Arc::clone(&commits_seen) }) as Box<dyn DataLayer>
        });

        let res = dispatch(&app, request(Method::GET, "/spy")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(res.emitted_bytes().unwrap(), br#"{"error":"missing field"}"#);
        assert_eq!(counters.handle.load(Ordering::SeqCst), 0);
        assert_eq!(commits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_handle_commits_exactly_once() {
        let (spy, _) = SpyRoute::new(Behavior::Emit);
        let commits = Arc::new(AtomicUsize::new(0));
        let commits_seen = Arc::clone(&commits);
        let app = App::new(Router::new().register(spy)).data(move || {
            Box::new(CountingData { commits: Arc::clone(&commits_seen) }) as Box<dyn DataLayer>
        });

        let res = dispatch(&app, request(Method::GET, "/spy")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::OK));
        assert_eq!(commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn silent_handle_trips_the_safety_net() {
        let (spy, counters) = SpyRoute::new(Behavior::Silent);
        let app = App::new(Router::new().register(spy));

        let res = dispatch(&app, request(Method::GET, "/spy")).await;

        assert_eq!(counters.handle.load(Ordering::SeqCst), 1);
        assert_eq!(res.emitted_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn failing_handle_is_isolated_to_its_own_request() {
        let (spy, _) = SpyRoute::new(Behavior::Fail);
        let app = App::new(Router::new().register(spy).register(StatusRoute));

        let res = dispatch(&app, request(Method::GET, "/spy")).await;
        assert_eq!(res.emitted_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        // The next unrelated request on the same app is served normally.
        let res = dispatch(&app, request(Method::GET, "/status")).await;
        assert_eq!(res.emitted_status(), Some(StatusCode::OK));
        assert_eq!(res.emitted_bytes().unwrap(), br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn show_image_without_id_is_rejected_before_handle() {
        let app = App::new(Router::new().register(ShowImageRoute::new("shows")));

        let res = dispatch(&app, request(Method::GET, "/show/image")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(res.emitted_bytes().unwrap(), br#"{"error":"No ID provided."}"#);
    }

    #[tokio::test]
    async fn show_image_with_id_emits_binary_png() {
        let app = App::new(Router::new().register(ShowImageRoute::new("shows")));

        let res = dispatch(&app, request(Method::GET, "/show/image?id=42")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::OK));
        assert_eq!(res.emitted_content(), Some(ContentType::Png));
        assert_eq!(res.cors_policy(), &Cors::All);
        // File-backed body, resolved at write-out time.
        assert!(res.emitted_bytes().is_none());
    }

    #[tokio::test]
    async fn show_image_rejects_path_traversal_ids() {
        let app = App::new(Router::new().register(ShowImageRoute::new("shows")));

        let res = dispatch(&app, request(Method::GET, "/show/image?id=..%2Fsecret")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(res.emitted_bytes().unwrap(), br#"{"error":"Invalid ID."}"#);
    }

    #[tokio::test]
    async fn moderation_fails_closed_as_not_implemented() {
        let app = App::new(Router::new().register(ModerationRoute));

        let res = dispatch(&app, request(Method::POST, "/moderation")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(res.emitted_bytes().unwrap(), br#"{"error":"Not implemented"}"#);
    }

    #[tokio::test]
    async fn moderation_with_disabled_data_layer_is_internal() {
        struct DisabledData;
        impl DataLayer for DisabledData {
            fn is_enabled(&self) -> bool {
                false
            }
            fn commit(&mut self) -> Result<(), Error> {
                Ok(())
            }
        }

        let app = App::new(Router::new().register(ModerationRoute))
            .data(|| Box::new(DisabledData) as Box<dyn DataLayer>);

        let res = dispatch(&app, request(Method::POST, "/moderation")).await;

        assert_eq!(res.emitted_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn dispatch_never_leaves_a_request_without_a_response() {
        let (spy_silent, _) = SpyRoute::new(Behavior::Silent);
        let app = App::new(Router::new().register(spy_silent).register(StatusRoute));

        for req in [
            request(Method::GET, "/spy"),
            request(Method::PUT, "/status"),
            request(Method::GET, "/missing"),
            request(Method::GET, "/status"),
        ] {
            let res = dispatch(&app, req).await;
            assert!(res.is_emitted());
            assert!(!res.contract_violated());
        }
    }
}
