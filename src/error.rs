/// Error types for host and storage calls
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrouperError>;

#[derive(Error, Debug)]
pub enum GrouperError {
    #[error("Tab service call failed: {0}")]
    Host(String),

    #[error("Storage call failed: {0}")]
    Storage(String),

    #[error("Failed to convert value: {0}")]
    Serialization(String),

    #[error("Unrecognized message: {0}")]
    Message(String),
}

impl From<serde_json::Error> for GrouperError {
    fn from(e: serde_json::Error) -> Self {
        GrouperError::Serialization(e.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for GrouperError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        GrouperError::Serialization(e.to_string())
    }
}
