use thiserror::Error;

use wm_core::{AgentAddr, ClientMac, CoreError};

/// Failures reported by (or while talking to) agents and the controller.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("probe of agent {agent} timed out")]
    Timeout { agent: AgentAddr },

    #[error("controller call `{call}` timed out after {after_ms} ms")]
    ControllerTimeout { call: &'static str, after_ms: u64 },

    #[error("agent {agent} unreachable: {reason}")]
    Unreachable { agent: AgentAddr, reason: String },

    #[error("agent {0} is not known to the controller")]
    UnknownAgent(AgentAddr),

    #[error("agent {agent} cannot hear client {client}")]
    ClientNotVisible { agent: AgentAddr, client: ClientMac },

    #[error("handoff of {client} to {target} rejected: {reason}")]
    HandoffRejected {
        client: ClientMac,
        target: AgentAddr,
        reason: String,
    },

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("channel plan error: {0}")]
    Plan(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
