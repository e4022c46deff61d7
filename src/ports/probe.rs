//! Signal probe port.

use std::future::Future;
use std::pin::Pin;

use crate::signal::SignalState;

/// Boxed future type alias used by [`SignalProbe`] to keep the trait dyn-compatible.
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = SignalState> + Send + 'a>>;

/// Reads the current state of the monitored signal.
///
/// Implementations absorb every failure: a probe that cannot reach or
/// understand the endpoint logs the cause and yields
/// [`SignalState::Unknown`]. Each call must finish in bounded time.
pub trait SignalProbe: Send + Sync {
    /// Performs one probe.
    fn probe(&self) -> ProbeFuture<'_>;
}
