//! Per-client mobility record.

use wm_core::{AgentAddr, Dbm, Timestamp};

/// The strongest signal seen for a client, and which agent saw it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    pub agent:  AgentAddr,
    pub signal: Dbm,
}

impl ScanResult {
    #[inline]
    pub fn new(agent: AgentAddr, signal: Dbm) -> Self {
        Self { agent, signal }
    }
}

/// Where a client stands in the handoff state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClientState {
    /// Record exists but no agent has been assigned yet.
    Unassigned,
    /// Client is served by this agent.
    Associated(AgentAddr),
}

/// Mobility bookkeeping for one client.
///
/// Created lazily on the client's first telemetry event and never removed.
/// Every mutator keeps `assignment_timestamp <= last_heard`, including when
/// events arrive out of order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MobilityRecord {
    /// Last value reported by the serving agent (or the first value ever
    /// seen, before bootstrap).
    pub signal_strength: Dbm,

    /// Most recent telemetry affecting this client, from any agent.
    pub last_heard: Timestamp,

    /// Last handoff or bootstrap assignment.
    pub assignment_timestamp: Timestamp,

    /// Agent currently believed to host the client.  `None` until bootstrap.
    pub serving_agent: Option<AgentAddr>,

    /// Strongest value observed across agents so far.
    pub best_scan: ScanResult,
}

impl MobilityRecord {
    /// A fresh, unassigned record seeded from the client's first event.
    pub fn unassigned(initial: Dbm, now: Timestamp, reporting: AgentAddr) -> Self {
        Self {
            signal_strength:      initial,
            last_heard:           now,
            assignment_timestamp: now,
            serving_agent:        None,
            best_scan:            ScanResult::new(reporting, initial),
        }
    }

    #[inline]
    pub fn state(&self) -> ClientState {
        match self.serving_agent {
            None        => ClientState::Unassigned,
            Some(agent) => ClientState::Associated(agent),
        }
    }

    #[inline]
    pub fn is_served_by(&self, agent: AgentAddr) -> bool {
        self.serving_agent == Some(agent)
    }

    /// Record a reading from the serving agent.
    ///
    /// `last_heard` never moves backwards.
    pub fn heard(&mut self, value: Dbm, at: Timestamp) {
        self.signal_strength = value;
        self.last_heard      = self.last_heard.max(at);
    }

    /// Offer a scan observation; it replaces `best_scan` when at least as
    /// strong.  Returns whether it did.
    pub fn offer_scan(&mut self, candidate: ScanResult) -> bool {
        if candidate.signal >= self.best_scan.signal {
            self.best_scan = candidate;
            true
        } else {
            false
        }
    }

    /// Bind the client to `agent` as of `at`.
    pub fn assign(&mut self, agent: AgentAddr, value: Dbm, at: Timestamp) {
        self.serving_agent        = Some(agent);
        self.signal_strength      = value;
        self.last_heard           = self.last_heard.max(at);
        self.assignment_timestamp = at.min(self.last_heard);
    }
}
