use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtPolicyError {
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}
