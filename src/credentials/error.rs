use crate::credentials::ini::CredentialsFileError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials file malformed: {0}")]
    Malformed(#[from] CredentialsFileError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("credential secret {0} has no expiration annotation")]
    MissingExpiration(String),

    #[error("credential secret {0} has an unparseable expiration annotation: {1}")]
    InvalidExpiration(String, String),
}
