//! The concrete object store this crate runs against: one [`TypedCollection`]
//! per kind. A real deployment would back each collection with cluster API
//! server calls instead; the reconcilers never know the difference because
//! they only ever go through [`TypedStore`].

use super::memory::TypedCollection;
use super::meta::NamespacedName;
use crate::domain::{
    AIBackend, AIRoute, BackendSecurityPolicy, Deployment, ExtensionPolicy, Gateway,
    GatewayConfig, HttpRoute, Pod, ReferenceGrant, RewriteFilter, Secret, UnixSocketBackend,
};

#[derive(Default)]
pub struct ObjectStore {
    pub ai_routes: TypedCollection<AIRoute>,
    pub ai_backends: TypedCollection<AIBackend>,
    pub security_policies: TypedCollection<BackendSecurityPolicy>,
    pub gateways: TypedCollection<Gateway>,
    pub gateway_configs: TypedCollection<GatewayConfig>,
    pub http_routes: TypedCollection<HttpRoute>,
    pub extension_policies: TypedCollection<ExtensionPolicy>,
    pub uds_backends: TypedCollection<UnixSocketBackend>,
    pub reference_grants: TypedCollection<ReferenceGrant>,
    pub rewrite_filters: TypedCollection<RewriteFilter>,
    pub secrets: TypedCollection<Secret>,
    pub pods: TypedCollection<Pod>,
    pub deployments: TypedCollection<Deployment>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deletes an `HTTPRoute` owned by `owner_uid`, the cascade the owner
    /// reference mechanism provides when an `AIRoute` is deleted
    /// (`spec.md` §3 "Lifecycle").
    pub fn cascade_delete_http_route_owned_by(&self, owner_uid: &str) {
        let victims: Vec<NamespacedName> = self
            .http_routes
            .all()
            .into_iter()
            .filter(|r| r.meta.owner_refs.iter().any(|o| o.uid == owner_uid))
            .map(|r| r.meta.key())
            .collect();
        for key in victims {
            self.http_routes.remove(&key);
        }
    }
}
