//! Signal-strength values and the telemetry event that carries them.

use std::fmt;

use crate::{AgentAddr, ClientMac, Timestamp};

// ── Dbm ───────────────────────────────────────────────────────────────────────

/// A signed signal-strength reading in dBm-like units.  Larger is stronger.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dbm(pub i32);

impl Dbm {
    /// `self` raised by `margin` dB, saturating instead of overflowing.
    #[inline]
    pub fn plus(self, margin: i32) -> Dbm {
        Dbm(self.0.saturating_add(margin))
    }
}

impl fmt::Display for Dbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dBm", self.0)
    }
}

// ── SignalEvent ───────────────────────────────────────────────────────────────

/// One telemetry sample: `agent` heard `client` at `value` at `timestamp`.
///
/// Produced by the subscription transport and consumed exactly once by the
/// mobility manager.  Never stored.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalEvent {
    pub client:    ClientMac,
    pub agent:     AgentAddr,
    pub value:     Dbm,
    pub timestamp: Timestamp,
}

impl SignalEvent {
    #[inline]
    pub fn new(client: ClientMac, agent: AgentAddr, value: Dbm, timestamp: Timestamp) -> Self {
        Self { client, agent, value, timestamp }
    }
}
