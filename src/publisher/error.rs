use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("filter config requires {0} shards, exceeds max supported slots {1}")]
    ExceedsMaxSlots(usize, usize),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),

    #[error("corrupt chunk secret: {0}")]
    CorruptChunk(String),
}
