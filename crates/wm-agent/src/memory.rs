//! An in-process agent network implementing every collaborator trait.
//!
//! Used by the test suites and the demo binary.  All state sits behind
//! interior mutability so a test can reshape the radio environment (move a
//! client, take an agent down, inject handoff failures) while a manager holds
//! an `Arc` to the same network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use wm_core::{AgentAddr, Channel, ClientMac, Dbm, SignalEvent};

use crate::{
    AgentControl, AgentError, AgentResult, ClientHandle, ClientRegistry, HandoffExecutor,
    Subscription, TelemetrySource,
};

/// Buffer size of each subscriber channel.
const SUBSCRIBER_BUFFER: usize = 1024;

#[derive(Clone, Copy, Debug)]
struct AgentState {
    channel:       Channel,
    reachable:     bool,
    probe_latency: Duration,
}

/// See the module docs.
#[derive(Default)]
pub struct InMemoryNetwork {
    agents:           DashMap<AgentAddr, AgentState>,
    /// What each agent hears from each client.
    signals:          DashMap<(AgentAddr, ClientMac), Dbm>,
    /// Registered clients and the agent hosting each one.
    clients:          DashMap<ClientMac, Option<AgentAddr>>,
    /// Remaining injected failures per client.
    failing_handoffs: DashMap<ClientMac, u32>,
    handoff_log:      Mutex<Vec<(ClientMac, AgentAddr)>>,
    subscribers:      Mutex<Vec<(Subscription, mpsc::Sender<SignalEvent>)>>,
    scans:            AtomicUsize,
    handoff_calls:    AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// Add a reachable agent on `channel` with zero probe latency.
    pub fn add_agent(&self, agent: AgentAddr, channel: Channel) {
        self.agents.insert(agent, AgentState {
            channel,
            reachable:     true,
            probe_latency: Duration::ZERO,
        });
    }

    /// Make `agent` refuse (or accept again) every request.
    pub fn set_reachable(&self, agent: AgentAddr, reachable: bool) {
        if let Some(mut state) = self.agents.get_mut(&agent) {
            state.reachable = reachable;
        }
    }

    /// Delay every scan served by `agent`.
    pub fn set_probe_latency(&self, agent: AgentAddr, latency: Duration) {
        if let Some(mut state) = self.agents.get_mut(&agent) {
            state.probe_latency = latency;
        }
    }

    pub fn channel_of(&self, agent: AgentAddr) -> Option<Channel> {
        self.agents.get(&agent).map(|s| s.channel)
    }

    // ── Clients and radio environment ─────────────────────────────────────

    /// Register `client` with the controller, not yet bound to any agent.
    pub fn register_client(&self, client: ClientMac) {
        self.clients.entry(client).or_insert(None);
    }

    /// Set what `agent` reports for `client` when scanned.
    pub fn set_signal(&self, agent: AgentAddr, client: ClientMac, value: Dbm) {
        self.signals.insert((agent, client), value);
    }

    /// `agent` can no longer hear `client`.
    pub fn clear_signal(&self, agent: AgentAddr, client: ClientMac) {
        self.signals.remove(&(agent, client));
    }

    /// The agent the controller currently has `client` bound to.
    pub fn bound_agent(&self, client: ClientMac) -> Option<AgentAddr> {
        self.clients.get(&client).and_then(|a| *a)
    }

    // ── Handoffs ──────────────────────────────────────────────────────────

    /// Reject the next `count` handoffs of `client`.
    pub fn fail_next_handoffs(&self, client: ClientMac, count: u32) {
        self.failing_handoffs.insert(client, count);
    }

    /// Every successful handoff, in the order applied.
    pub fn handoffs(&self) -> Vec<(ClientMac, AgentAddr)> {
        lock(&self.handoff_log).clone()
    }

    /// Handoff attempts, successful or not.
    pub fn handoff_attempts(&self) -> usize {
        self.handoff_calls.load(Ordering::Relaxed)
    }

    /// Scan requests served (including failed ones).
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    // ── Telemetry ─────────────────────────────────────────────────────────

    /// Deliver `event` to every subscriber whose subscription matches.
    ///
    /// Returns the number of subscribers that received it.  Closed
    /// subscribers are dropped.
    pub async fn publish(&self, event: SignalEvent) -> usize {
        let targets: Vec<mpsc::Sender<SignalEvent>> = lock(&self.subscribers)
            .iter()
            .filter(|(sub, _)| sub.matches(&event))
            .map(|(_, tx)| tx.clone())
            .collect();

        let mut delivered = 0;
        for tx in targets {
            if tx.send(event).await.is_ok() {
                delivered += 1;
            }
        }
        lock(&self.subscribers).retain(|(_, tx)| !tx.is_closed());
        delivered
    }

    fn live_agent(&self, agent: AgentAddr) -> AgentResult<AgentState> {
        let state = *self.agents.get(&agent).ok_or(AgentError::UnknownAgent(agent))?;
        if !state.reachable {
            return Err(AgentError::Unreachable {
                agent,
                reason: "agent is down".into(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl AgentControl for InMemoryNetwork {
    async fn list_agents(&self) -> Vec<AgentAddr> {
        let mut agents: Vec<AgentAddr> = self.agents.iter().map(|e| *e.key()).collect();
        agents.sort();
        agents
    }

    async fn current_channel(&self, agent: AgentAddr) -> AgentResult<Channel> {
        self.live_agent(agent).map(|s| s.channel)
    }

    async fn set_channel(&self, agent: AgentAddr, channel: Channel) -> AgentResult<()> {
        self.live_agent(agent)?;
        if let Some(mut state) = self.agents.get_mut(&agent) {
            state.channel = channel;
        }
        Ok(())
    }

    async fn scan_client(
        &self,
        agent:    AgentAddr,
        client:   ClientMac,
        _channel: Channel,
        _timeout: Duration,
    ) -> AgentResult<Dbm> {
        self.scans.fetch_add(1, Ordering::Relaxed);
        let state = self.live_agent(agent)?;

        // A slow agent ignores the requested timeout, like a hung one would.
        if !state.probe_latency.is_zero() {
            tokio::time::sleep(state.probe_latency).await;
        }

        let value = self
            .signals
            .get(&(agent, client))
            .map(|v| *v)
            .ok_or(AgentError::ClientNotVisible { agent, client })?;
        debug!(%agent, %client, %value, "scan served");
        Ok(value)
    }
}

#[async_trait]
impl ClientRegistry for InMemoryNetwork {
    async fn lookup_client(&self, client: ClientMac) -> Option<ClientHandle> {
        self.clients
            .get(&client)
            .map(|agent| ClientHandle { mac: client, agent: *agent })
    }
}

#[async_trait]
impl HandoffExecutor for InMemoryNetwork {
    async fn handoff(&self, client: ClientMac, target: AgentAddr) -> AgentResult<()> {
        self.handoff_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(mut remaining) = self.failing_handoffs.get_mut(&client) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AgentError::HandoffRejected {
                    client,
                    target,
                    reason: "injected failure".into(),
                });
            }
        }
        self.live_agent(target)?;
        if !self.clients.contains_key(&client) {
            return Err(AgentError::HandoffRejected {
                client,
                target,
                reason: "client not registered".into(),
            });
        }

        self.clients.insert(client, Some(target));
        lock(&self.handoff_log).push((client, target));
        Ok(())
    }
}

#[async_trait]
impl TelemetrySource for InMemoryNetwork {
    async fn subscribe(&self, subscription: Subscription) -> AgentResult<mpsc::Receiver<SignalEvent>> {
        if subscription.metric != crate::METRIC_SIGNAL {
            return Err(AgentError::Subscription(format!(
                "unsupported metric {:?}",
                subscription.metric
            )));
        }
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        lock(&self.subscribers).push((subscription, tx));
        Ok(rx)
    }
}
