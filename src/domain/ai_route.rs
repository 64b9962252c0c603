use super::status::Status;
use crate::store::{KubeObject, NamespacedName, ObjectMeta};
use serde::{Deserialize, Serialize};

/// `{family, version}` input wire-format schema, e.g. `{"openai", "v1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSchema {
    pub family: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRef {
    pub name: String,
    /// `None` means "the `AIRoute`'s own namespace". A non-`None` value
    /// requires an admitting `ReferenceGrant` per `spec.md` §3 invariant 7.
    #[serde(default)]
    pub namespace: Option<String>,
    pub weight: u32,
    pub priority: i32,
}

impl BackendRef {
    pub fn resolve(&self, route_namespace: &str) -> crate::store::NamespacedName {
        crate::store::NamespacedName::new(
            self.namespace.clone().unwrap_or_else(|| route_namespace.to_string()),
            self.name.clone(),
        )
    }

    pub fn is_cross_namespace(&self, route_namespace: &str) -> bool {
        self.namespace.as_deref().is_some_and(|ns| ns != route_namespace)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub request_timeout_ms: Option<u64>,
    pub backend_request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIRouteRule {
    /// User-declared match criteria (e.g. model-name header) the external
    /// processor uses to pick this rule. Not to be confused with the
    /// distinguished selected-route header the synthesized `HTTPRoute`
    /// matches on — see `routesynth`.
    pub matches: Vec<HeaderMatch>,
    pub backend_refs: Vec<BackendRef>,
    pub timeouts: Option<Timeouts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRef {
    pub name: String,
    pub namespace: Option<String>,
}

impl GatewayRef {
    pub fn resolve(&self, route_namespace: &str) -> NamespacedName {
        NamespacedName::new(
            self.namespace.clone().unwrap_or_else(|| route_namespace.to_string()),
            self.name.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostType {
    InputToken,
    OutputToken,
    TotalToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmRequestCost {
    Builtin { metadata_key: String, cost_type: CostType },
    Cel { metadata_key: String, expression: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIRoute {
    pub meta: ObjectMeta,
    pub schema: ApiSchema,
    pub rules: Vec<AIRouteRule>,
    pub target_gateways: Vec<GatewayRef>,
    pub llm_request_costs: Vec<LlmRequestCost>,
    #[serde(default)]
    pub status: Status,
}

impl KubeObject for AIRoute {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl AIRoute {
    pub fn key(&self) -> NamespacedName {
        self.meta.key()
    }

    /// Every backend resolved to its `(namespace, name)`, in declaration
    /// order, de-duplicated. Used both for reference resolution and for
    /// computing the reverse backend→route index.
    pub fn referenced_backends(&self) -> Vec<NamespacedName> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for rule in &self.rules {
            for r in &rule.backend_refs {
                let key = r.resolve(&self.meta.namespace);
                if seen.insert(key.clone()) {
                    out.push(key);
                }
            }
        }
        out
    }
}
