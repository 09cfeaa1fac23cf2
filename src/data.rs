//! Per-request handle to the persistence layer.
//!
//! The dispatch core does not know what the data layer is — SQL, flat files,
//! an in-memory map. It knows three things: a handle may report itself
//! disabled (the `"db"` middleware fails requests closed when it does),
//! writes made during `handle` stay pending until committed, and the
//! dispatcher commits exactly once after `handle` returns and before the
//! response goes out.

use crate::error::Error;

/// One request's exclusive handle to the persistence layer.
///
/// Never shared across requests. `commit` must be idempotent: the dispatcher
/// calls it once per request, but a handle that was already flushed must
/// treat a second call as a no-op rather than a double write.
pub trait DataLayer: Send {
    /// False when the backing store failed to initialize; the `"db"`
    /// middleware turns this into an internal-class rejection.
    fn is_enabled(&self) -> bool;

    /// Flushes pending writes. Synchronous from the dispatcher's view.
    fn commit(&mut self) -> Result<(), Error>;
}

/// Creates one fresh [`DataLayer`] handle per inbound request.
pub trait DataFactory: Send + Sync {
    fn open(&self) -> Box<dyn DataLayer>;
}

impl<F> DataFactory for F
where
    F: Fn() -> Box<dyn DataLayer> + Send + Sync,
{
    fn open(&self) -> Box<dyn DataLayer> {
        self()
    }
}

/// Data layer for deployments with no persistence: always enabled, commits
/// are no-ops. The default when an [`App`](crate::App) is built without one.
#[derive(Debug, Default)]
pub struct NullData;

impl DataLayer for NullData {
    fn is_enabled(&self) -> bool {
        true
    }

    fn commit(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
