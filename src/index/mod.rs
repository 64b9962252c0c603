//! Cross-resource indices. `spec.md` §2 ("Indexer") and §9.
//!
//! Four reverse lookups, each rebuilt from one reconciler's view of its own
//! object on every reconcile:
//!
//! - `backend_to_routes`: which `AIRoute`s reference a given `AIBackend`.
//! - `gateway_to_routes`: which `AIRoute`s target a given `Gateway`.
//! - `policy_to_backends_legacy`: which `AIBackend`s point at a given
//!   `BackendSecurityPolicy` via the legacy reverse pointer.

mod reverse;

pub use reverse::ReverseIndex;

use crate::domain::{AIBackend, AIRoute};
use crate::store::NamespacedName;

#[derive(Default)]
pub struct Indexer {
    pub backend_to_routes: ReverseIndex,
    pub gateway_to_routes: ReverseIndex,
    pub policy_to_backends_legacy: ReverseIndex,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reindex_route(&self, route: &AIRoute) {
        let key = route.key();
        let backend_targets = route
            .referenced_backends()
            .into_iter()
            .map(|b| b.dotted())
            .collect();
        self.backend_to_routes.update(&key, backend_targets);

        let gateway_targets = route
            .target_gateways
            .iter()
            .map(|g| g.resolve(&route.meta.namespace).dotted())
            .collect();
        self.gateway_to_routes.update(&key, gateway_targets);
    }

    pub fn remove_route(&self, key: &NamespacedName) {
        self.backend_to_routes.remove_referencer(key);
        self.gateway_to_routes.remove_referencer(key);
    }

    pub fn reindex_backend(&self, backend: &AIBackend) {
        let key = backend.key();
        let targets = match &backend.security_policy_ref {
            Some(name) => vec![NamespacedName::new(backend.meta.namespace.clone(), name.clone()).dotted()],
            None => Vec::new(),
        };
        self.policy_to_backends_legacy.update(&key, targets);
    }

    pub fn remove_backend(&self, key: &NamespacedName) {
        self.policy_to_backends_legacy.remove_referencer(key);
    }

    pub fn routes_referencing_backend(&self, backend: &NamespacedName) -> Vec<NamespacedName> {
        self.backend_to_routes.referencers_of(&backend.dotted())
    }

    pub fn routes_targeting_gateway(&self, gateway: &NamespacedName) -> Vec<NamespacedName> {
        self.gateway_to_routes.referencers_of(&gateway.dotted())
    }

    pub fn backends_pointing_at_policy_legacy(&self, policy: &NamespacedName) -> Vec<NamespacedName> {
        self.policy_to_backends_legacy.referencers_of(&policy.dotted())
    }
}
