//! Fluent builder for constructing a [`MobilityManager`].

use std::sync::Arc;

use wm_agent::{AgentControl, ChannelPlan, ClientRegistry, HandoffExecutor, Subscription};
use wm_core::PolicyConfig;
use wm_mobility::{MobilityStateStore, ScanAggregator};
use wm_policy::HandoffPolicy;

use crate::{ManagerObserver, ManagerResult, ManagerStats, MobilityManager, NoopObserver};

/// Fluent builder for [`MobilityManager<A, R, H, O>`].
///
/// # Required inputs
///
/// - `A: AgentControl` — agent listing, channels, scans
/// - `R: ClientRegistry` — which clients exist
/// - `H: HandoffExecutor` — applies bootstraps and handoffs
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                  |
/// |---------------------|------------------------------------------|
/// | `.config(c)`        | `PolicyConfig::default()`                |
/// | `.channel_plan(p)`  | empty plan (no agent is retuned)         |
/// | `.subscription(s)`  | `Subscription::all_clients_signal()`     |
/// | `.observer(o)`      | `NoopObserver`                           |
///
/// # Example
///
/// ```rust,ignore
/// let net = Arc::new(InMemoryNetwork::new());
/// let manager = ManagerBuilder::for_network(Arc::clone(&net))
///     .config(PolicyConfig { signal_margin: 3, ..PolicyConfig::default() })
///     .channel_plan(ChannelPlan::lab_default())
///     .build()?;
/// let task = Arc::new(manager).start(net.as_ref()).await?;
/// ```
pub struct ManagerBuilder<A, R, H, O = NoopObserver> {
    control:      Arc<A>,
    registry:     Arc<R>,
    executor:     Arc<H>,
    config:       PolicyConfig,
    channel_plan: ChannelPlan,
    subscription: Subscription,
    observer:     O,
}

impl<A, R, H> ManagerBuilder<A, R, H, NoopObserver>
where
    A: AgentControl,
    R: ClientRegistry,
    H: HandoffExecutor,
{
    /// Create a builder with all required collaborators.
    pub fn new(control: Arc<A>, registry: Arc<R>, executor: Arc<H>) -> Self {
        Self {
            control,
            registry,
            executor,
            config:       PolicyConfig::default(),
            channel_plan: ChannelPlan::new(),
            subscription: Subscription::all_clients_signal(),
            observer:     NoopObserver,
        }
    }
}

impl<N> ManagerBuilder<N, N, N, NoopObserver>
where
    N: AgentControl + ClientRegistry + HandoffExecutor,
{
    /// Use one controller for agents, registry, and handoffs.
    pub fn for_network(network: Arc<N>) -> Self {
        Self::new(Arc::clone(&network), Arc::clone(&network), network)
    }
}

impl<A, R, H, O> ManagerBuilder<A, R, H, O>
where
    A: AgentControl,
    R: ClientRegistry,
    H: HandoffExecutor,
    O: ManagerObserver,
{
    /// Policy thresholds.  Checked in [`build`](Self::build).
    pub fn config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    /// Static agent → channel assignment pushed by
    /// [`MobilityManager::start`].
    pub fn channel_plan(mut self, plan: ChannelPlan) -> Self {
        self.channel_plan = plan;
        self
    }

    /// Replace the telemetry subscription registered at startup.
    ///
    /// Useful when the source reports negative dBm, which the default
    /// `signal > 0` filter would drop.
    pub fn subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = subscription;
        self
    }

    /// Attach an observer, replacing any previous one.
    pub fn observer<P: ManagerObserver>(self, observer: P) -> ManagerBuilder<A, R, H, P> {
        ManagerBuilder {
            control:      self.control,
            registry:     self.registry,
            executor:     self.executor,
            config:       self.config,
            channel_plan: self.channel_plan,
            subscription: self.subscription,
            observer,
        }
    }

    /// Validate the configuration and return a ready-to-start manager.
    ///
    /// # Errors
    ///
    /// [`ManagerError::Config`][crate::ManagerError::Config] when the policy
    /// thresholds are inconsistent; the manager refuses to exist.
    pub fn build(self) -> ManagerResult<MobilityManager<A, R, H, O>> {
        let policy  = HandoffPolicy::new(self.config)?;
        let scanner = ScanAggregator::new(Arc::clone(&self.control), policy.config().probe_timeout());

        Ok(MobilityManager {
            policy,
            store:        MobilityStateStore::new(),
            scanner,
            control:      self.control,
            registry:     self.registry,
            executor:     self.executor,
            observer:     self.observer,
            stats:        ManagerStats::default(),
            channel_plan: self.channel_plan,
            subscription: self.subscription,
        })
    }
}
