use super::ai_route::{ApiSchema, Timeouts};
use super::status::Status;
use crate::store::{KubeObject, NamespacedName, ObjectMeta};
use serde::{Deserialize, Serialize};

/// Reference to the transport-level backend object (a Kubernetes `Service`
/// or similar) an `AIBackend` fronts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendObjectRef {
    pub name: String,
    pub namespace: Option<String>,
    pub port: Option<u16>,
}

impl BackendObjectRef {
    /// `"<name>.<namespace>"`, the literal transport target `spec.md` §4.2
    /// requires the synthesized `HTTPRoute` to carry.
    pub fn transport_target(&self, fallback_namespace: &str) -> String {
        let ns = self.namespace.as_deref().unwrap_or(fallback_namespace);
        format!("{}.{}", self.name, ns)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIBackend {
    pub meta: ObjectMeta,
    pub backend_ref: BackendObjectRef,
    pub output_schema: ApiSchema,
    /// Legacy reverse pointer: this `AIBackend` names the security policy
    /// that authenticates to it. Unioned with the new target-ref direction
    /// per `spec.md` §3 invariant union and Open Question 1.
    pub security_policy_ref: Option<String>,
    pub timeouts: Option<Timeouts>,
    #[serde(default)]
    pub status: Status,
}

impl KubeObject for AIBackend {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl AIBackend {
    pub fn key(&self) -> NamespacedName {
        self.meta.key()
    }
}
