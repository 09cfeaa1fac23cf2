//! Application wiring: routes, middleware, and the data layer.

use std::sync::Arc;

use crate::data::{DataFactory, DataLayer, NullData};
use crate::middleware::MiddlewareRegistry;
use crate::router::Router;

/// Everything the dispatcher needs to serve requests: the route registry,
/// the middleware registry, and a factory producing one data-layer handle
/// per request. Built once at startup, shared across connections.
pub struct App {
    router: Router,
    middleware: Arc<MiddlewareRegistry>,
    data: Arc<dyn DataFactory>,
}

impl App {
    /// Wraps a router with the default middleware registry and a
    /// no-persistence data layer.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            middleware: Arc::new(MiddlewareRegistry::with_defaults()),
            data: Arc::new(|| Box::new(NullData) as Box<dyn DataLayer>),
        }
    }

    /// Replaces the middleware registry.
    pub fn middleware(mut self, registry: MiddlewareRegistry) -> Self {
        self.middleware = Arc::new(registry);
        self
    }

    /// Replaces the per-request data-layer factory.
    pub fn data(mut self, factory: impl DataFactory + 'static) -> Self {
        self.data = Arc::new(factory);
        self
    }

    pub(crate) fn router(&self) -> &Router {
        &self.router
    }

    pub(crate) fn middleware_registry(&self) -> Arc<MiddlewareRegistry> {
        Arc::clone(&self.middleware)
    }

    pub(crate) fn open_data(&self) -> Box<dyn DataLayer> {
        self.data.open()
    }
}
