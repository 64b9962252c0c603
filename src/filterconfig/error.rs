use crate::store::{NamespacedName, StoreError};
use thiserror::Error;

/// `spec.md` §4.6, §7. All variants are `ValidationError`/`MissingReference`
/// in the crate-wide taxonomy: the caller's reconciler writes `NotAccepted`
/// and does not requeue on a fixed backoff.
#[derive(Debug, Error)]
pub enum FilterConfigError {
    #[error("no AIRoute attached")]
    NoAttachedRoutes,

    #[error("input schema mismatch: route {0} declares {1:?}, expected {2:?}")]
    SchemaMismatch(String, crate::domain::ApiSchema, crate::domain::ApiSchema),

    #[error("AIBackend {0} not found")]
    MissingBackend(NamespacedName),

    #[error("secret {0} missing data key {1}")]
    MissingSecretData(NamespacedName, &'static str),

    #[error("unknown security policy variant for backend {0}")]
    UnknownPolicyVariant(NamespacedName),

    #[error("CEL expression for metadata key {0} failed to compile: {1}")]
    CelCompileError(String, String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Credentials(#[from] crate::credentials::CredentialsError),
}
