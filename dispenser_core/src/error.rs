use dispenser_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispenseError {
    #[error("controller not connected")]
    DeviceUnavailable,
    #[error("a dispense session is already in progress")]
    SessionActive,
    #[error("invalid target: {0}")]
    InvalidTarget(&'static str),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for DispenseError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SessionActive => DispenseError::SessionActive,
            other => DispenseError::Storage(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispenseError>;
