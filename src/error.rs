use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Inventory has not finished loading")]
    NotLoaded,
}

impl InventoryError {
    /// Whether this error came from the remote mirror rather than local state.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            InventoryError::Network(_)
                | InventoryError::Http { .. }
                | InventoryError::Parse(_)
                | InventoryError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
