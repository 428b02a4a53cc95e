use thiserror::Error;

use wm_core::ClientMac;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("client {0} has no mobility record")]
    ClientNotTracked(ClientMac),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
