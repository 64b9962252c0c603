use thiserror::Error;

/// `spec.md` §4.8's failure taxonomy, folded into the crate-wide
/// `ExternalServiceError` / fatal split from §7.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("client secret unreadable: {0}")]
    ClientSecretUnreadable(String),

    #[error("OIDC discovery failed: {0}")]
    OidcDiscovery(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("AWS STS call failed: {0}")]
    Sts(String),

    #[error("Azure token endpoint call failed: {0}")]
    Azure(String),

    #[error("unknown security policy variant: {0}")]
    UnknownVariant(String),

    #[error(transparent)]
    Credentials(#[from] crate::credentials::CredentialsError),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

impl RotationError {
    /// Whether `spec.md` §4.4's "requeue after 1 minute" applies, as
    /// opposed to a fatal/no-requeue error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RotationError::OidcDiscovery(_)
                | RotationError::TokenExchange(_)
                | RotationError::Sts(_)
                | RotationError::Azure(_)
        )
    }
}
