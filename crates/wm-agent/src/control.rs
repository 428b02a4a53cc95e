//! Collaborator interfaces consumed by the mobility manager.
//!
//! The manager never talks to agents directly.  Everything it needs from the
//! wireless control plane goes through these four traits, so the decision
//! core can run against a real controller, a replay harness, or the
//! [`InMemoryNetwork`][crate::InMemoryNetwork] used in tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use wm_core::{AgentAddr, Channel, ClientMac, Dbm, SignalEvent};

use crate::{AgentResult, Subscription};

/// A client as known to the controller's registry.
///
/// `agent` is the controller's own view of where the client's virtual access
/// point lives, independent of the manager's bookkeeping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClientHandle {
    pub mac:   ClientMac,
    pub agent: Option<AgentAddr>,
}

/// Agent discovery, channel control, and on-demand signal scans.
#[async_trait]
pub trait AgentControl: Send + Sync + 'static {
    /// Every agent currently known to the controller.
    async fn list_agents(&self) -> Vec<AgentAddr>;

    /// The channel `agent` is operating on.
    async fn current_channel(&self, agent: AgentAddr) -> AgentResult<Channel>;

    /// Move `agent` to `channel`.  Only used by the startup channel plan.
    async fn set_channel(&self, agent: AgentAddr, channel: Channel) -> AgentResult<()>;

    /// Ask `agent` how strongly it hears `client` on `channel`.
    ///
    /// Implementations should give up after `timeout`; callers enforce the
    /// bound independently as well.
    async fn scan_client(
        &self,
        agent:   AgentAddr,
        client:  ClientMac,
        channel: Channel,
        timeout: Duration,
    ) -> AgentResult<Dbm>;
}

/// Lookup of clients registered with the controller.
#[async_trait]
pub trait ClientRegistry: Send + Sync + 'static {
    /// `None` when the client is unknown to the controller.
    async fn lookup_client(&self, client: ClientMac) -> Option<ClientHandle>;
}

/// Applies handoff decisions by migrating a client's virtual access point.
#[async_trait]
pub trait HandoffExecutor: Send + Sync + 'static {
    async fn handoff(&self, client: ClientMac, target: AgentAddr) -> AgentResult<()>;
}

/// The event-subscription transport.
///
/// Matching telemetry is delivered on the returned channel; dropping the
/// receiver ends the subscription.
#[async_trait]
pub trait TelemetrySource: Send + Sync + 'static {
    async fn subscribe(&self, subscription: Subscription) -> AgentResult<mpsc::Receiver<SignalEvent>>;
}
