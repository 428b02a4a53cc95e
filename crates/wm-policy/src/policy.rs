//! The handoff decision function.

use wm_core::{PolicyConfig, SignalEvent};
use wm_mobility::{MobilityRecord, ScanResult};

use crate::{Action, Decision, HandoffReason, PolicyResult, Suppression};

/// Hysteresis / idle-timeout handoff policy.
///
/// Evaluation is split in two pure steps so the caller can run the (slow,
/// side-effecting) scan only when it matters:
///
/// 1. [`needs_scan`](Self::needs_scan): does this event warrant probing the
///    other agents?
/// 2. [`decide`](Self::decide): given the event, the current record, and the
///    scan's best candidate (if one was run), produce a [`Decision`].
///
/// Rules, first match wins:
///
/// | # | Condition                                   | Verdict                                  |
/// |---|---------------------------------------------|------------------------------------------|
/// | 1 | client unknown to the registry              | handled by the caller, no record made    |
/// | 2 | record unassigned                           | `BootstrapAssign` to the reporting agent |
/// | 3 | silent longer than `idle_client_ms`         | `Handoff` to best candidate (or reporter)|
/// | 4 | event from serving agent, inside hysteresis | `NoAction(Hysteresis)`                   |
/// | 4 | event from serving agent, after hysteresis  | `Handoff` if candidate ≥ value + margin  |
/// | 5 | event from any other agent                  | passive bookkeeping only                 |
#[derive(Clone, Debug)]
pub struct HandoffPolicy {
    config: PolicyConfig,
}

impl HandoffPolicy {
    /// Build a policy, refusing configurations that fail
    /// [`PolicyConfig::validate`].
    pub fn new(config: PolicyConfig) -> PolicyResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    #[inline]
    fn is_idle(&self, event: &SignalEvent, record: &MobilityRecord) -> bool {
        event.timestamp.since(record.last_heard) > self.config.idle_client_ms
    }

    #[inline]
    fn in_hysteresis(&self, event: &SignalEvent, record: &MobilityRecord) -> bool {
        event.timestamp.since(record.assignment_timestamp) < self.config.hysteresis_ms
    }

    /// Whether [`decide`](Self::decide) will look at a scan result for this
    /// event.  When `false`, pass `None`.
    pub fn needs_scan(&self, event: &SignalEvent, record: &MobilityRecord) -> bool {
        match record.serving_agent {
            None                                    => false,
            Some(_) if self.is_idle(event, record)  => true,
            Some(serving) if serving == event.agent => !self.in_hysteresis(event, record),
            Some(_)                                 => false,
        }
    }

    /// Decide what to do with `event` given the client's current `record`.
    ///
    /// `scan` is the best candidate among the agents other than
    /// `event.agent`, or `None` when no scan was run or every probe failed.
    pub fn decide(
        &self,
        event:  &SignalEvent,
        record: &MobilityRecord,
        scan:   Option<ScanResult>,
    ) -> Decision {
        let now = event.timestamp;

        // ── Rule 2: bootstrap ─────────────────────────────────────────────
        let Some(serving) = record.serving_agent else {
            let mut applied = *record;
            applied.assign(event.agent, event.value, now);
            return Decision {
                action:   Action::BootstrapAssign { agent: event.agent },
                applied,
                retained: *record,
            };
        };

        // ── Rule 3: idle timeout overrides hysteresis ─────────────────────
        if self.is_idle(event, record) {
            let mut applied = *record;
            if let Some(candidate) = scan {
                applied.offer_scan(candidate);
            }
            let target = scan.map_or(event.agent, |c| c.agent);
            applied.assign(target, event.value, now);

            if target == serving {
                // Only the serving agent's own readings describe the link.
                applied.signal_strength = match scan {
                    _ if event.agent == serving => event.value,
                    Some(candidate)             => candidate.signal,
                    None                        => record.signal_strength,
                };
                return Decision::settled(Action::NoAction(Suppression::AlreadyServing), applied);
            }
            return Decision {
                action: Action::Handoff {
                    from:   serving,
                    to:     target,
                    reason: HandoffReason::IdleTimeout,
                },
                applied,
                retained: *record,
            };
        }

        // ── Rule 4: telemetry from the serving agent ──────────────────────
        if serving == event.agent {
            let mut observed = *record;
            observed.heard(event.value, now);

            if self.in_hysteresis(event, record) {
                return Decision::settled(Action::NoAction(Suppression::Hysteresis), observed);
            }

            if let Some(candidate) = scan {
                observed.offer_scan(candidate);
                let threshold = event.value.plus(self.config.signal_margin);
                if candidate.agent != serving && candidate.signal >= threshold {
                    let mut applied = observed;
                    applied.assign(candidate.agent, event.value, now);
                    return Decision {
                        action: Action::Handoff {
                            from:   serving,
                            to:     candidate.agent,
                            reason: HandoffReason::StrongerCandidate,
                        },
                        applied,
                        retained: observed,
                    };
                }
            }
            return Decision::settled(Action::NoAction(Suppression::NoBetterCandidate), observed);
        }

        // ── Rule 5: telemetry from a non-serving agent ────────────────────
        let mut observed = *record;
        observed.offer_scan(ScanResult::new(event.agent, event.value));
        observed.last_heard = observed.last_heard.max(now);
        Decision::settled(Action::NoAction(Suppression::NonServingAgent), observed)
    }
}
