use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("conflict updating {0}: resource version changed, retry with a fresh read")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}
