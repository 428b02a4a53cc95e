//! Telemetry subscriptions: which clients, which metric, which comparison.

use std::fmt;

use wm_core::{ClientMac, SignalEvent};

/// Name of the signal-strength metric reported by agents.
pub const METRIC_SIGNAL: &str = "signal";

/// Which clients a subscription covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClientPattern {
    /// Every client (`*`).
    Any,
    /// A single station.
    Exact(ClientMac),
}

impl ClientPattern {
    #[inline]
    pub fn matches(self, client: ClientMac) -> bool {
        match self {
            ClientPattern::Any        => true,
            ClientPattern::Exact(mac) => mac == client,
        }
    }
}

impl fmt::Display for ClientPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientPattern::Any        => f.write_str("*"),
            ClientPattern::Exact(mac) => mac.fmt(f),
        }
    }
}

/// Comparison applied between a reported value and the threshold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Relation {
    Equals,
    GreaterThan,
    LessThan,
}

impl Relation {
    #[inline]
    pub fn holds(self, value: i64, threshold: i64) -> bool {
        match self {
            Relation::Equals      => value == threshold,
            Relation::GreaterThan => value > threshold,
            Relation::LessThan    => value < threshold,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Equals      => "==",
            Relation::GreaterThan => ">",
            Relation::LessThan    => "<",
        })
    }
}

/// Interest in telemetry matching `pattern` / `metric` / `relation threshold`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub pattern:   ClientPattern,
    pub metric:    String,
    pub relation:  Relation,
    pub threshold: i64,
}

impl Subscription {
    /// The mobility manager's single subscription: `* signal > 0`.
    pub fn all_clients_signal() -> Self {
        Self::new(ClientPattern::Any, Relation::GreaterThan, 0)
    }

    /// A signal-metric subscription with an arbitrary pattern and comparison.
    pub fn new(pattern: ClientPattern, relation: Relation, threshold: i64) -> Self {
        Self {
            pattern,
            metric: METRIC_SIGNAL.to_string(),
            relation,
            threshold,
        }
    }

    /// Whether a signal event satisfies this subscription.
    pub fn matches(&self, event: &SignalEvent) -> bool {
        self.metric == METRIC_SIGNAL
            && self.pattern.matches(event.client)
            && self.relation.holds(i64::from(event.value.0), self.threshold)
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.pattern, self.metric, self.relation, self.threshold)
    }
}
