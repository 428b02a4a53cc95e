use thiserror::Error;

use wm_core::CoreError;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid handoff policy: {0}")]
    Config(#[from] CoreError),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
