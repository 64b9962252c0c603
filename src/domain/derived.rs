//! Controller-owned objects this crate writes, never the user.

use crate::store::{KubeObject, NamespacedName, ObjectMeta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBackendRef {
    pub target: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpRouteMatch {
    Header { name: String, value: String },
    PathPrefix { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRouteRule {
    pub matches: Vec<HttpRouteMatch>,
    pub backend_refs: Vec<ResolvedBackendRef>,
    pub filters: Vec<String>,
    pub timeout_ms: Option<u64>,
}

/// The host gateway's `HTTPRoute`, one per `AIRoute`. See `spec.md` §4.2 and
/// invariants 1, 2, 4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRoute {
    pub meta: ObjectMeta,
    pub parent_refs: Vec<NamespacedName>,
    pub rules: Vec<HttpRouteRule>,
}

impl KubeObject for HttpRoute {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionPolicy {
    pub meta: ObjectMeta,
    pub gateway: NamespacedName,
    pub uds_backend_name: String,
}

impl KubeObject for ExtensionPolicy {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnixSocketBackend {
    pub meta: ObjectMeta,
    pub uds_path: String,
}

impl KubeObject for UnixSocketBackend {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

/// Admits a cross-namespace backend reference. See `spec.md` §3 invariant 7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceGrant {
    pub meta: ObjectMeta,
    pub from_group: String,
    pub from_kind: String,
    pub from_namespace: String,
    pub to_group: String,
    pub to_kind: String,
}

impl KubeObject for ReferenceGrant {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl ReferenceGrant {
    pub fn admits(&self, from_namespace: &str) -> bool {
        self.from_group == "aigateway"
            && self.from_kind == "AIGatewayRoute"
            && self.from_namespace == from_namespace
            && self.to_group == "aigateway"
            && self.to_kind == "AIServiceBackend"
    }
}

/// Namespace-scoped rewrite filter: one per namespace, ensured by the
/// `AIRoute` reconciler before any `HTTPRoute` attaches it. `spec.md` §4.2
/// step 1. The backend-hostname rewrite it performs is the host gateway's
/// concern; this crate only ensures the object's existence and references
/// its fixed name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteFilter {
    pub meta: ObjectMeta,
}

impl KubeObject for RewriteFilter {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

/// Opaque, string-keyed blob storage. Backs both credential secrets and the
/// filter-config index/chunk secrets; nothing in this crate parses a
/// `Secret` it did not itself write, other than the credentials-file and
/// index-document formats defined in `credentials`/`filterconfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secret {
    pub meta: ObjectMeta,
    pub data: std::collections::HashMap<String, String>,
}

impl KubeObject for Secret {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub meta: ObjectMeta,
    pub container_names: Vec<String>,
}

impl KubeObject for Pod {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    pub meta: ObjectMeta,
    pub pod_template_annotations: std::collections::HashMap<String, String>,
}

impl KubeObject for Deployment {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}
