//! # showboard
//!
//! The request-dispatch backend for the showboard review API.
//!
//! ## The contract
//!
//! Every request runs through one fixed pipeline:
//!
//! ```text
//! session → route resolution → method check → validate (+ middleware)
//!         → handle → data commit → response emitted
//! ```
//!
//! Any stage may short-circuit by emitting a terminal response, and exactly
//! one terminal response comes out of every request — a route that forgets
//! to respond, or fails unexpectedly, is converted into a 500 at the
//! dispatch boundary instead of taking the process down.
//!
//! The pieces:
//!
//! - [`Router`] — static exact-match registry of [`Route`]s
//! - [`Route`] — two-phase contract: `validate` (pure, may request
//!   middleware by name) then `handle` (the effect)
//! - [`MiddlewareRegistry`] — named precondition checks like `"db"`
//! - [`Session`] — the per-request context, threaded explicitly
//! - [`Response`] — single-emission builder with status, CORS, and
//!   JSON / binary / file-backed bodies
//! - [`HttpResult`] — tri-state check outcome, no exceptions in the
//!   validation path
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use showboard::{App, Router, Server};
//! use showboard::routes::{ModerationRoute, ShowImageRoute, StatusRoute};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .register(StatusRoute)
//!         .register(ShowImageRoute::new("shows"))
//!         .register(ModerationRoute);
//!
//!     Server::bind("0.0.0.0:3000")
//!         .serve(App::new(router))
//!         .await
//!         .unwrap();
//! }
//! ```

mod app;
mod data;
mod dispatch;
mod error;
mod middleware;
mod response;
mod result;
mod route;
mod router;
mod server;
mod session;

pub mod routes;

pub use app::App;
pub use data::{DataFactory, DataLayer, NullData};
pub use dispatch::dispatch;
pub use error::Error;
pub use middleware::{DatabaseMiddleware, Middleware, MiddlewareRegistry};
pub use response::{ContentType, Cors, Response};
pub use result::HttpResult;
pub use route::Route;
pub use router::Router;
pub use server::Server;
pub use session::{HttpInfo, RoutingInfo, Session};
