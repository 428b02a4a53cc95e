//! Static agent → channel assignment applied once at startup.
//!
//! # CSV format
//!
//! ```csv
//! agent,channel
//! 192.168.1.7,4
//! 192.168.1.8,10
//! ```
//!
//! Agents absent from the plan keep whatever channel they booted on.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use wm_core::{AgentAddr, Channel};

use crate::{AgentControl, AgentError, AgentResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlanRecord {
    agent:   String,
    channel: u8,
}

// ── ChannelPlan ───────────────────────────────────────────────────────────────

/// Fixed channel per agent address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelPlan {
    channels: BTreeMap<AgentAddr, Channel>,
}

impl ChannelPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two-agent lab deployment: `192.168.1.7` on channel 4 and
    /// `192.168.1.8` on channel 10.
    pub fn lab_default() -> Self {
        Self::new()
            .with(AgentAddr::v4(192, 168, 1, 7), Channel(4))
            .with(AgentAddr::v4(192, 168, 1, 8), Channel(10))
    }

    /// Builder-style insert.
    pub fn with(mut self, agent: AgentAddr, channel: Channel) -> Self {
        self.channels.insert(agent, channel);
        self
    }

    pub fn get(&self, agent: AgentAddr) -> Option<Channel> {
        self.channels.get(&agent).copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Load a plan from a CSV file.
    pub fn load_csv(path: &Path) -> AgentResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Like [`load_csv`](Self::load_csv) but accepts any `Read` source.
    ///
    /// A later row for the same agent overrides an earlier one.
    pub fn from_reader<R: Read>(reader: R) -> AgentResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut plan = Self::new();

        for result in csv_reader.deserialize::<PlanRecord>() {
            let row   = result.map_err(|e| AgentError::Plan(e.to_string()))?;
            let agent = row.agent.parse::<AgentAddr>()?;
            plan.channels.insert(agent, Channel(row.channel));
        }
        Ok(plan)
    }

    /// Push the plan to every live agent it names.
    ///
    /// Agents the controller does not list are skipped.  A failure to retune
    /// one agent is logged and does not stop the others.  Returns the number
    /// of agents successfully retuned.
    pub async fn apply<A: AgentControl + ?Sized>(&self, control: &A) -> usize {
        let mut applied = 0;
        for agent in control.list_agents().await {
            let Some(channel) = self.get(agent) else {
                continue;
            };
            match control.current_channel(agent).await {
                Ok(before) => info!(%agent, %before, "agent channel before assignment"),
                Err(e)     => warn!(%agent, error = %e, "could not read agent channel"),
            }
            match control.set_channel(agent, channel).await {
                Ok(()) => {
                    info!(%agent, %channel, "agent channel assigned");
                    applied += 1;
                }
                Err(e) => warn!(%agent, %channel, error = %e, "channel assignment failed"),
            }
        }
        applied
    }
}
