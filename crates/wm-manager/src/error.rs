use thiserror::Error;

use wm_agent::AgentError;
use wm_core::{AgentAddr, ClientMac};
use wm_policy::PolicyError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("mobility manager configuration error: {0}")]
    Config(#[from] PolicyError),

    #[error("handoff of {client} to {target} failed after retry: {source}")]
    HandoffFailed {
        client: ClientMac,
        target: AgentAddr,
        #[source]
        source: AgentError,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type ManagerResult<T> = Result<T, ManagerError>;
