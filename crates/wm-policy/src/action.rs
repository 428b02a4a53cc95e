//! What the policy wants done for one telemetry event.

use std::fmt;

use wm_core::AgentAddr;
use wm_mobility::MobilityRecord;

/// Why a handoff was chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandoffReason {
    /// The client was silent longer than the idle threshold.
    IdleTimeout,
    /// Another agent hears the client at least as well as the serving one,
    /// plus the configured margin.
    StrongerCandidate,
}

/// Why no handoff was issued.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Suppression {
    /// Still inside the dwell window after the last assignment.
    Hysteresis,
    /// Outside the dwell window, but nobody beats the serving agent.
    NoBetterCandidate,
    /// Telemetry from an agent that does not serve the client.
    NonServingAgent,
    /// An idle client's best target is the agent already serving it; the
    /// assignment is refreshed in place.
    AlreadyServing,
}

/// The policy's verdict for one event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    NoAction(Suppression),

    /// First binding of an unassigned client to the agent that reported it.
    BootstrapAssign { agent: AgentAddr },

    /// Move the client from `from` to `to`.
    Handoff {
        from:   AgentAddr,
        to:     AgentAddr,
        reason: HandoffReason,
    },
}

impl Action {
    /// The agent the handoff executor must be called with, if any.
    #[inline]
    pub fn target(&self) -> Option<AgentAddr> {
        match *self {
            Action::NoAction(_)               => None,
            Action::BootstrapAssign { agent } => Some(agent),
            Action::Handoff { to, .. }        => Some(to),
        }
    }

    #[inline]
    pub fn needs_dispatch(&self) -> bool {
        self.target().is_some()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::NoAction(why)                => write!(f, "no action ({why:?})"),
            Action::BootstrapAssign { agent }    => write!(f, "bootstrap to {agent}"),
            Action::Handoff { from, to, reason } => write!(f, "handoff {from} -> {to} ({reason:?})"),
        }
    }
}

/// A verdict plus the two records the caller may commit.
///
/// The policy is pure: it never writes.  The caller commits `applied` when
/// the action needs no dispatch or the dispatch succeeded, and `retained`
/// when the dispatch ultimately failed, so a failed handoff never leaves a
/// new serving agent or assignment time behind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub action:   Action,
    pub applied:  MobilityRecord,
    pub retained: MobilityRecord,
}

impl Decision {
    /// A verdict with nothing to dispatch: both outcomes are the same record.
    #[inline]
    pub(crate) fn settled(action: Action, record: MobilityRecord) -> Self {
        Self { action, applied: record, retained: record }
    }
}
