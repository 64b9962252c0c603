//! The five root-kind reconcilers and the work-dispatch framework driving
//! them. `spec.md` §2, §4.1-§4.5, §5.

mod ai_backend;
mod ai_route;
mod dispatcher;
mod error;
mod gateway;
mod gateway_config;
mod security_policy;

pub use ai_backend::AiBackendReconciler;
pub use ai_route::AiRouteReconciler;
pub use dispatcher::run_worker_loop;
pub use error::ReconcileError;
pub use gateway::GatewayReconciler;
pub use gateway_config::GatewayConfigReconciler;
pub use security_policy::SecurityPolicyReconciler;

use crate::store::NamespacedName;
use async_trait::async_trait;

/// Generalized from the teacher's `control::reconciler::Reconciler`: same
/// shape (`async_trait`, `Send + Sync`, a `name()` for logging/tracing),
/// but the contract differs — an implementor reads one object by key from
/// the object store and derives/writes whatever `spec.md` §4 says that
/// kind owns, rather than annotating a shared in-memory request object.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Reconciles the object named by `key`. A key absent from the store
    /// is not an error: cascade-delete already cleaned up anything this
    /// reconcile would have derived.
    async fn reconcile(&self, key: &NamespacedName) -> Result<(), ReconcileError>;

    /// Name for logging and tracing spans.
    fn name(&self) -> &str;
}
