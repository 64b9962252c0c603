//! The five user-owned resource kinds (`spec.md` §3) plus the objects this
//! crate derives from them.

pub mod ai_backend;
pub mod ai_route;
pub mod backend_security_policy;
pub mod derived;
pub mod gateway;
pub mod status;

pub use ai_backend::{AIBackend, BackendObjectRef};
pub use ai_route::{
    AIRoute, AIRouteRule, ApiSchema, BackendRef, CostType, GatewayRef, HeaderMatch,
    LlmRequestCost, Timeouts,
};
pub use backend_security_policy::{
    BackendSecurityPolicy, OidcConfig, SecretRef, SecurityPolicyVariant,
};
pub use derived::{
    Deployment, ExtensionPolicy, HttpRoute, HttpRouteMatch, HttpRouteRule, Pod, ReferenceGrant,
    ResolvedBackendRef, RewriteFilter, Secret, UnixSocketBackend,
};
pub use gateway::{ExtprocResources, Gateway, GatewayConfig};
pub use status::{Condition, ConditionType, Status};

/// Well-known distinguished keys shared by the filter config builder and
/// the route synthesizer. Centralized here so both sides reference the same
/// literal, per `spec.md` §4.2 invariant 2.
pub const MODEL_NAME_HEADER_KEY: &str = "x-ai-eg-model";
pub const SELECTED_ROUTE_HEADER_KEY: &str = "x-ai-eg-selected-route";
pub const METADATA_NAMESPACE: &str = "io.envoyproxy.ai_gateway";

/// `"<route>-rule-<i>"`, the distinguished header value invariant 2
/// requires. The sole place this format is assembled.
pub fn rule_header_value(route_name: &str, rule_index: usize) -> String {
    format!("{route_name}-rule-{rule_index}")
}
