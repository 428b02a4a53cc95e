//! `ScanAggregator` — ask every other agent how well it hears a client and
//! pick the strongest candidate.

use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use wm_agent::{AgentControl, AgentError, AgentResult};
use wm_core::{AgentAddr, ClientMac, Dbm};

use crate::ScanResult;

/// Outcome of one aggregation round.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// The winning candidate, or `None` when every probe failed (or there
    /// was nobody to probe).
    pub best: Option<ScanResult>,

    /// Every successful probe, in agent-address order.
    pub results: Vec<ScanResult>,

    /// Agents excluded from selection and why.
    pub failures: Vec<(AgentAddr, AgentError)>,
}

impl ScanReport {
    /// Total probes issued.
    pub fn probed(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

/// Fans a scan request out to all agents but the reporting one.
///
/// Probes run concurrently and each is cut off at `probe_timeout`, so one
/// round never takes meaningfully longer than that, however many agents
/// there are.
pub struct ScanAggregator<A: AgentControl + ?Sized> {
    control:       Arc<A>,
    probe_timeout: Duration,
}

impl<A: AgentControl + ?Sized> ScanAggregator<A> {
    pub fn new(control: Arc<A>, probe_timeout: Duration) -> Self {
        Self { control, probe_timeout }
    }

    #[inline]
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Probe every known agent except `reporting` for its view of `client`.
    ///
    /// `serving` only matters for tie-breaking (see [`select_best`]).
    /// Failed probes are logged and excluded; they never count as a weak
    /// signal.
    pub async fn scan(
        &self,
        client:    ClientMac,
        reporting: AgentAddr,
        serving:   Option<AgentAddr>,
    ) -> ScanReport {
        let mut agents = self.control.list_agents().await;
        agents.retain(|&a| a != reporting);
        agents.sort();
        agents.dedup();

        let outcomes = join_all(agents.into_iter().map(|agent| self.probe(agent, client))).await;

        let mut report = ScanReport::default();
        for (agent, outcome) in outcomes {
            match outcome {
                Ok(signal) => report.results.push(ScanResult::new(agent, signal)),
                Err(e) => {
                    debug!(%agent, %client, error = %e, "scan probe failed; agent excluded");
                    report.failures.push((agent, e));
                }
            }
        }
        report.best = select_best(report.results.iter().copied(), serving);
        report
    }

    async fn probe(&self, agent: AgentAddr, client: ClientMac) -> (AgentAddr, AgentResult<Dbm>) {
        let timeout = self.probe_timeout;
        let attempt = async {
            let channel = self.control.current_channel(agent).await?;
            self.control.scan_client(agent, client, channel, timeout).await
        };
        let outcome = match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_)     => Err(AgentError::Timeout { agent }),
        };
        (agent, outcome)
    }
}

/// Pick the strictly strongest result.
///
/// Equal maxima go to `serving` if it is among them, otherwise to the lowest
/// agent address, so ties never cause a needless move.
pub fn select_best<I>(results: I, serving: Option<AgentAddr>) -> Option<ScanResult>
where
    I: IntoIterator<Item = ScanResult>,
{
    results
        .into_iter()
        .max_by_key(|r| (r.signal, Some(r.agent) == serving, Reverse(r.agent)))
}
