use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("a dispense session is already in progress")]
    SessionActive,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
