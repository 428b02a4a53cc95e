//! Manager observer trait for operator reporting and data collection.

use wm_agent::AgentError;
use wm_core::{AgentAddr, ClientMac, SignalEvent};
use wm_mobility::MobilityRecord;
use wm_policy::Action;

/// Callbacks invoked by [`MobilityManager`][crate::MobilityManager] as each
/// event is processed.
///
/// Events for different clients are handled on different tasks, so hooks
/// take `&self` and may be called concurrently.  All methods have default
/// no-op implementations.
///
/// # Example — failure counter
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Pager { failures: AtomicUsize }
///
/// impl ManagerObserver for Pager {
///     fn on_handoff_failed(&self, client: ClientMac, target: AgentAddr, error: &AgentError) {
///         self.failures.fetch_add(1, Ordering::Relaxed);
///         eprintln!("page: {client} -> {target}: {error}");
///     }
/// }
/// ```
pub trait ManagerObserver: Send + Sync + 'static {
    /// Called once the policy has reached a verdict, before any dispatch.
    fn on_decision(&self, _event: &SignalEvent, _action: &Action) {}

    /// Called with the record as written back to the store.
    ///
    /// After a failed dispatch this is the retained record, not the one the
    /// decision would have produced.
    fn on_committed(&self, _client: ClientMac, _record: &MobilityRecord) {}

    /// Called when a handoff or bootstrap still fails after its retries.
    fn on_handoff_failed(&self, _client: ClientMac, _target: AgentAddr, _error: &AgentError) {}
}

/// A [`ManagerObserver`] that does nothing.
pub struct NoopObserver;

impl ManagerObserver for NoopObserver {}
