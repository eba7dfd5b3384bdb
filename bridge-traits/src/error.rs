use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Media asset is not playable: {0}")]
    NotPlayable(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
