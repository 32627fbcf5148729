use entbridge_core::BridgeError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error(transparent)]
    Remote(#[from] BridgeError),

    #[error("{0} is not set")]
    MissingSetting(&'static str),
}
