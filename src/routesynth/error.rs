use crate::store::{NamespacedName, StoreError};
use thiserror::Error;

/// `spec.md` §4.2 failure + §7 "MissingReference"/"ValidationError".
#[derive(Debug, Error)]
pub enum RouteSynthError {
    #[error("AIBackend {0} not found")]
    BackendNotFound(NamespacedName),

    #[error("cross-namespace backend reference from {0} to {1} not admitted by any ReferenceGrant")]
    ReferenceNotAdmitted(String, NamespacedName),

    #[error(transparent)]
    Store(#[from] StoreError),
}
