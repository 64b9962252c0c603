use crate::credentials::CredentialsError;
use crate::extpolicy::ExtPolicyError;
use crate::filterconfig::FilterConfigError;
use crate::publisher::PublisherError;
use crate::rotation::RotationError;
use crate::routesynth::RouteSynthError;
use crate::store::StoreError;
use thiserror::Error;

/// The crate-wide error taxonomy `spec.md` §7 describes, folded into one
/// enum so the dispatcher can decide whether to requeue without knowing
/// which subsystem raised it.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    RouteSynth(#[from] RouteSynthError),

    #[error(transparent)]
    FilterConfig(#[from] FilterConfigError),

    #[error(transparent)]
    Publisher(#[from] PublisherError),

    #[error(transparent)]
    ExtPolicy(#[from] ExtPolicyError),

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),

    #[error("unknown security policy variant for {0}")]
    UnknownPolicyVariant(String),
}

impl ReconcileError {
    /// `spec.md` §4.4, §7: external-service-class failures (OIDC/STS/Azure
    /// token exchange, a resource-version conflict) and a missing reference
    /// requeue on the fixed backoff. Validation failures are terminal for
    /// this generation of the object; the next triggering event, not a
    /// timer, is what gets them reconsidered.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::Rotation(e) => e.is_retryable(),
            ReconcileError::Store(StoreError::Conflict(_)) => true,
            ReconcileError::RouteSynth(RouteSynthError::BackendNotFound(_)) => true,
            _ => false,
        }
    }
}
