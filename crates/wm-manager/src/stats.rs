//! Running counters kept by the manager.

use std::sync::atomic::{AtomicU64, Ordering};

use wm_policy::Action;

/// Lock-free event counters, updated from every processing task.
#[derive(Debug, Default)]
pub struct ManagerStats {
    events:            AtomicU64,
    discarded:         AtomicU64,
    bootstraps:        AtomicU64,
    handoffs:          AtomicU64,
    suppressed:        AtomicU64,
    failed_dispatches: AtomicU64,
    probe_failures:    AtomicU64,
}

/// A point-in-time copy of [`ManagerStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events received, including discarded ones.
    pub events:            u64,
    /// Events for clients unknown to the registry.
    pub discarded:         u64,
    pub bootstraps:        u64,
    pub handoffs:          u64,
    /// Events that ended in `NoAction`.
    pub suppressed:        u64,
    /// Dispatches that still failed after retrying.
    pub failed_dispatches: u64,
    pub probe_failures:    u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl ManagerStats {
    pub(crate) fn event(&self) {
        bump(&self.events, 1);
    }

    pub(crate) fn discarded(&self) {
        bump(&self.discarded, 1);
    }

    pub(crate) fn probe_failures(&self, n: usize) {
        bump(&self.probe_failures, n as u64);
    }

    pub(crate) fn failed_dispatch(&self) {
        bump(&self.failed_dispatches, 1);
    }

    /// Count a committed verdict.
    pub(crate) fn committed(&self, action: &Action) {
        match action {
            Action::NoAction(_)            => bump(&self.suppressed, 1),
            Action::BootstrapAssign { .. } => bump(&self.bootstraps, 1),
            Action::Handoff { .. }         => bump(&self.handoffs, 1),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            events:            load(&self.events),
            discarded:         load(&self.discarded),
            bootstraps:        load(&self.bootstraps),
            handoffs:          load(&self.handoffs),
            suppressed:        load(&self.suppressed),
            failed_dispatches: load(&self.failed_dispatches),
            probe_failures:    load(&self.probe_failures),
        }
    }
}
