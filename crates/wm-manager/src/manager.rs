//! The `MobilityManager` struct and its per-event pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, trace, warn};

use wm_agent::{
    AgentControl, AgentError, AgentResult, ChannelPlan, ClientRegistry, HandoffExecutor, Subscription,
    TelemetrySource,
};
use wm_core::{AgentAddr, ClientMac, SignalEvent};
use wm_mobility::{MobilityRecord, MobilityStateStore, ScanAggregator};
use wm_policy::{Action, HandoffPolicy};

use crate::{ManagerError, ManagerObserver, ManagerResult, ManagerStats};

/// Events queued per client before the event loop stops reading telemetry.
pub const CLIENT_QUEUE_DEPTH: usize = 64;

// ── Outcome ───────────────────────────────────────────────────────────────────

/// What happened to one telemetry event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The client is unknown to the registry; no record was touched.
    Discarded,

    /// The verdict was carried out and `record` written back.
    Committed {
        action: Action,
        record: MobilityRecord,
    },
}

// ── MobilityManager ───────────────────────────────────────────────────────────

/// The event dispatcher.
///
/// For every [`SignalEvent`]:
///
/// 1. **Registry**: unknown clients are discarded before any record exists.
/// 2. **Record**: fetch or create the client's record and take its lock.
///    The lock is held until step 6, so events for one client are decided
///    and committed one at a time while other clients proceed in parallel.
///    [`run`](Self::run) additionally feeds each client's events through a
///    single worker, so they are applied in arrival order.
/// 3. **Scan**: if the policy asks for it, probe every other agent.
/// 4. **Decide**: [`HandoffPolicy::decide`].
/// 5. **Dispatch**: call the handoff executor for bootstraps and handoffs,
///    retrying up to `handoff_retries` times.  The registry lookup and each
///    attempt are bounded by `controller_timeout_ms`.
/// 6. **Commit**: write the decided record, or the retained one if the
///    dispatch failed.
///
/// Create via [`ManagerBuilder`][crate::ManagerBuilder].
pub struct MobilityManager<A, R, H, O>
where
    A: AgentControl,
    R: ClientRegistry,
    H: HandoffExecutor,
    O: ManagerObserver,
{
    pub(crate) policy:       HandoffPolicy,
    pub(crate) store:        MobilityStateStore,
    pub(crate) scanner:      ScanAggregator<A>,
    pub(crate) control:      Arc<A>,
    pub(crate) registry:     Arc<R>,
    pub(crate) executor:     Arc<H>,
    pub(crate) observer:     O,
    pub(crate) stats:        ManagerStats,
    pub(crate) channel_plan: ChannelPlan,
    pub(crate) subscription: Subscription,
}

impl<A, R, H, O> MobilityManager<A, R, H, O>
where
    A: AgentControl,
    R: ClientRegistry,
    H: HandoffExecutor,
    O: ManagerObserver,
{
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn policy(&self) -> &HandoffPolicy {
        &self.policy
    }

    /// Per-client records, for inspection.
    pub fn store(&self) -> &MobilityStateStore {
        &self.store
    }

    pub fn stats(&self) -> &ManagerStats {
        &self.stats
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    // ── Startup and event loop ────────────────────────────────────────────

    /// Apply the channel plan, subscribe once to `source`, and spawn the
    /// event loop.
    ///
    /// The returned task ends when the source closes its channel and every
    /// in-flight event has been processed.
    pub async fn start<S>(self: Arc<Self>, source: &S) -> ManagerResult<JoinHandle<()>>
    where
        S: TelemetrySource + ?Sized,
    {
        let retuned = self.channel_plan.apply(&*self.control).await;
        info!(retuned, planned = self.channel_plan.len(), "channel plan applied");

        let rx = source.subscribe(self.subscription.clone()).await?;
        info!(subscription = %self.subscription, "telemetry subscription registered");

        Ok(tokio::spawn(self.run(rx)))
    }

    /// Consume events until `rx` closes.
    ///
    /// Each client gets one worker task with a queue of
    /// [`CLIENT_QUEUE_DEPTH`] events, so a client's events are processed
    /// strictly in arrival order while different clients proceed in
    /// parallel.  When a client's queue is full the loop waits, and the
    /// telemetry channel fills up behind it.
    ///
    /// Failures are logged and reported to the observer inside
    /// [`on_signal`](Self::on_signal); nothing a single event does can stop
    /// the loop.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<SignalEvent>) {
        let mut queues: HashMap<ClientMac, mpsc::Sender<SignalEvent>> = HashMap::new();
        let mut workers = JoinSet::new();

        while let Some(event) = rx.recv().await {
            let client = event.client;
            let queue  = queues
                .entry(client)
                .or_insert_with(|| Self::spawn_worker(&self, &mut workers, client))
                .clone();

            if let Err(SendError(event)) = queue.send(event).await {
                // The worker only goes away by panicking.
                warn!(%client, "client worker gone; restarting it");
                let queue = Self::spawn_worker(&self, &mut workers, client);
                if queue.send(event).await.is_err() {
                    error!(%client, "restarted client worker gone; event dropped");
                }
                queues.insert(client, queue);
            }

            while let Some(done) = workers.try_join_next() {
                reap(done);
            }
        }

        drop(queues);
        while let Some(done) = workers.join_next().await {
            reap(done);
        }
        debug!("telemetry channel closed; event loop finished");
    }

    fn spawn_worker(
        manager: &Arc<Self>,
        workers: &mut JoinSet<()>,
        client:  ClientMac,
    ) -> mpsc::Sender<SignalEvent> {
        let (tx, mut rx) = mpsc::channel(CLIENT_QUEUE_DEPTH);
        let manager      = Arc::clone(manager);
        workers.spawn(async move {
            while let Some(event) = rx.recv().await {
                // Already logged and reported.
                let _ = manager.on_signal(event).await;
            }
            trace!(%client, "client worker finished");
        });
        tx
    }

    // ── Per-event pipeline ────────────────────────────────────────────────

    /// Process one telemetry event end to end.
    ///
    /// # Errors
    ///
    /// [`ManagerError::HandoffFailed`] when the executor rejected or timed
    /// out on every attempt.  The retained record has already been committed
    /// by then, so the client is re-evaluated on its next event.
    ///
    /// [`ManagerError::Agent`] when the registry lookup overran
    /// `controller_timeout_ms`; no record is created or touched.
    pub async fn on_signal(&self, event: SignalEvent) -> ManagerResult<Outcome> {
        self.stats.event();
        let client = event.client;

        let limit  = self.policy.config().controller_timeout();
        let lookup = match tokio::time::timeout(limit, self.registry.lookup_client(client)).await {
            Ok(handle) => handle,
            Err(_)     => {
                let e = controller_timeout("lookup_client", limit);
                warn!(%client, agent = %event.agent, error = %e, "registry lookup timed out; event dropped");
                return Err(e.into());
            }
        };
        let Some(handle) = lookup else {
            trace!(%client, agent = %event.agent, "event for unregistered client discarded");
            self.stats.discarded();
            return Ok(Outcome::Discarded);
        };

        let (shared, created) = self.store.get_or_create(client, event.value, event.timestamp, event.agent);
        if created {
            debug!(%client, agent = %event.agent, "tracking new client");
        }
        let mut record = shared.lock().await;

        match (handle.agent, record.serving_agent) {
            (Some(bound), Some(serving)) if bound != serving => {
                warn!(%client, %bound, %serving, "registry and mobility record disagree on serving agent");
            }
            _ => {}
        }

        let best = if self.policy.needs_scan(&event, &record) {
            let report = self.scanner.scan(client, event.agent, record.serving_agent).await;
            self.stats.probe_failures(report.failures.len());
            report.best
        } else {
            None
        };

        let decision = self.policy.decide(&event, &record, best);
        let action   = decision.action;
        self.observer.on_decision(&event, &action);

        if let Some(target) = action.target() {
            if let Err(source) = self.dispatch(client, target).await {
                *record = decision.retained;
                self.stats.failed_dispatch();
                error!(%client, %target, %action, error = %source, "handoff dispatch failed; record left unchanged");
                self.observer.on_handoff_failed(client, target, &source);
                self.observer.on_committed(client, &record);
                return Err(ManagerError::HandoffFailed { client, target, source });
            }
        }

        *record = decision.applied;
        self.stats.committed(&action);
        match action {
            Action::BootstrapAssign { agent } => {
                info!(%client, %agent, signal = %event.value, "client bootstrapped");
            }
            Action::Handoff { from, to, reason } => {
                info!(%client, %from, %to, ?reason, signal = %event.value, "client handed off");
            }
            Action::NoAction(why) => {
                trace!(%client, agent = %event.agent, ?why, "no action");
            }
        }
        self.observer.on_committed(client, &record);

        Ok(Outcome::Committed { action, record: *record })
    }

    /// Call the executor, retrying the same target immediately on failure.
    /// An attempt that overruns `controller_timeout_ms` counts as failed.
    async fn dispatch(&self, client: ClientMac, target: AgentAddr) -> AgentResult<()> {
        let retries = self.policy.config().handoff_retries;
        let limit   = self.policy.config().controller_timeout();
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(limit, self.executor.handoff(client, target)).await {
                Ok(result) => result,
                Err(_)     => Err(controller_timeout("handoff", limit)),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    debug!(%client, %target, attempt, error = %e, "handoff attempt failed; retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn controller_timeout(call: &'static str, limit: std::time::Duration) -> AgentError {
    AgentError::ControllerTimeout { call, after_ms: limit.as_millis() as u64 }
}

fn reap(done: Result<(), tokio::task::JoinError>) {
    if let Err(e) = done {
        error!(error = %e, "client worker panicked");
    }
}
