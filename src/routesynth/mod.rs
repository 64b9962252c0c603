//! `RouteSynthesizer`: translates an `AIRoute` into the host gateway's
//! `HTTPRoute`. `spec.md` §4.2 and invariants 1, 2, 4, 7.

mod error;

pub use error::RouteSynthError;

use crate::domain::{
    rule_header_value, AIRoute, HttpRoute, HttpRouteMatch, HttpRouteRule, OwnerRef,
    ResolvedBackendRef, RewriteFilter, SELECTED_ROUTE_HEADER_KEY,
};
use crate::store::{NamespacedName, ObjectMeta, ObjectStore, TypedStore};

/// Fixed per-namespace rewrite-filter name. `spec.md` §4.2 step 1: "name is
/// fixed per namespace".
pub const REWRITE_FILTER_NAME: &str = "ai-gateway-backend-hostname-rewrite";

/// Annotation forcing host-gateway re-reconciliation on backend-priority
/// change. `spec.md` §3 invariant 4, §6.
pub const BACKEND_REF_PRIORITY_ANNOTATION: &str = "aigateway/backend-ref-priority";

pub struct RouteSynthesizer<'a> {
    store: &'a ObjectStore,
}

impl<'a> RouteSynthesizer<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    async fn ensure_rewrite_filter(&self, namespace: &str) -> Result<(), RouteSynthError> {
        let key = NamespacedName::new(namespace.to_string(), REWRITE_FILTER_NAME.to_string());
        if self.store.rewrite_filters.get(&key).await?.is_some() {
            return Ok(());
        }
        self.store
            .rewrite_filters
            .apply(RewriteFilter {
                meta: ObjectMeta {
                    namespace: namespace.to_string(),
                    name: REWRITE_FILTER_NAME.to_string(),
                    ..Default::default()
                },
            })
            .await?;
        Ok(())
    }

    async fn check_reference_grant(
        &self,
        route_namespace: &str,
        backend_key: &NamespacedName,
    ) -> Result<(), RouteSynthError> {
        if backend_key.namespace == route_namespace {
            return Ok(());
        }
        let grants = self.store.reference_grants.list(&backend_key.namespace).await?;
        if grants.iter().any(|g| g.admits(route_namespace)) {
            return Ok(());
        }
        Err(RouteSynthError::ReferenceNotAdmitted(
            route_namespace.to_string(),
            backend_key.clone(),
        ))
    }

    /// Builds the derived `HTTPRoute` for `route`. `spec.md` §4.2 steps 2-4.
    pub async fn synthesize(&self, route: &AIRoute) -> Result<HttpRoute, RouteSynthError> {
        self.ensure_rewrite_filter(&route.meta.namespace).await?;

        let mut rules = Vec::with_capacity(route.rules.len() + 1);
        let mut priority_parts = Vec::new();
        let mut first_backend_ref: Option<ResolvedBackendRef> = None;

        for (i, rule) in route.rules.iter().enumerate() {
            let mut backend_refs = Vec::with_capacity(rule.backend_refs.len());
            for backend_ref in &rule.backend_refs {
                let key = backend_ref.resolve(&route.meta.namespace);
                self.check_reference_grant(&route.meta.namespace, &key).await?;
                let backend = self
                    .store
                    .ai_backends
                    .get(&key)
                    .await?
                    .ok_or_else(|| RouteSynthError::BackendNotFound(key.clone()))?;

                let target = backend.backend_ref.transport_target(&key.namespace);
                priority_parts.push(format!("{i}:{}:{}", backend_ref.name, backend_ref.priority));

                let resolved = ResolvedBackendRef { target, weight: backend_ref.weight };
                if first_backend_ref.is_none() {
                    first_backend_ref = Some(resolved.clone());
                }
                backend_refs.push(resolved);
            }

            rules.push(HttpRouteRule {
                matches: vec![HttpRouteMatch::Header {
                    name: SELECTED_ROUTE_HEADER_KEY.to_string(),
                    value: rule_header_value(&route.meta.name, i),
                }],
                backend_refs,
                filters: vec![REWRITE_FILTER_NAME.to_string()],
                timeout_ms: rule.timeouts.and_then(|t| t.request_timeout_ms),
            });
        }

        // Mandatory catch-all: invariant 1, Open Question 2 (references the
        // first rule's first backend rather than a literal dead route).
        rules.push(HttpRouteRule {
            matches: vec![HttpRouteMatch::PathPrefix { path: "/".to_string() }],
            backend_refs: first_backend_ref.into_iter().collect(),
            filters: vec![],
            timeout_ms: None,
        });

        let parent_refs = route
            .target_gateways
            .iter()
            .map(|g| g.resolve(&route.meta.namespace))
            .collect();

        let mut meta = ObjectMeta {
            namespace: route.meta.namespace.clone(),
            name: route.meta.name.clone(),
            owner_refs: vec![OwnerRef {
                kind: "AIRoute".to_string(),
                name: route.meta.name.clone(),
                uid: route.meta.uid.clone(),
            }],
            ..Default::default()
        };
        meta.annotations
            .insert(BACKEND_REF_PRIORITY_ANNOTATION.to_string(), priority_parts.concat());

        Ok(HttpRoute { meta, parent_refs, rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AIBackend, AIRouteRule, ApiSchema, BackendObjectRef, BackendRef, GatewayRef, HeaderMatch,
        Status,
    };

    fn schema() -> ApiSchema {
        ApiSchema { family: "openai".to_string(), version: "v1".to_string() }
    }

    fn backend(name: &str, namespace: &str) -> AIBackend {
        AIBackend {
            meta: ObjectMeta { namespace: namespace.to_string(), name: name.to_string(), ..Default::default() },
            backend_ref: BackendObjectRef { name: format!("{name}-svc"), namespace: None, port: None },
            output_schema: schema(),
            security_policy_ref: None,
            timeouts: None,
            status: Status::default(),
        }
    }

    fn route_with_two_backends() -> AIRoute {
        AIRoute {
            meta: ObjectMeta { namespace: "ns1".to_string(), name: "route1".to_string(), ..Default::default() },
            schema: schema(),
            rules: vec![AIRouteRule {
                matches: vec![HeaderMatch { name: "x-model".to_string(), value: "gpt-4".to_string() }],
                backend_refs: vec![
                    BackendRef { name: "apple".to_string(), namespace: None, weight: 1, priority: 0 },
                    BackendRef { name: "orange".to_string(), namespace: None, weight: 1, priority: 0 },
                ],
                timeouts: None,
            }],
            target_gateways: vec![GatewayRef { name: "gw".to_string(), namespace: None }],
            llm_request_costs: vec![],
            status: Status::default(),
        }
    }

    #[tokio::test]
    async fn scenario_1_two_backend_refs_yield_three_rules() {
        let store = ObjectStore::new();
        store.ai_backends.apply(backend("apple", "ns1")).await.unwrap();
        store.ai_backends.apply(backend("orange", "ns1")).await.unwrap();

        let synth = RouteSynthesizer::new(&store);
        let http_route = synth.synthesize(&route_with_two_backends()).await.unwrap();

        assert_eq!(http_route.rules.len(), 3);
        match &http_route.rules[0].matches[0] {
            HttpRouteMatch::Header { value, .. } => assert_eq!(value, "route1-rule-0"),
            _ => panic!("expected header match"),
        }
        assert_eq!(http_route.rules[0].backend_refs[0].target, "apple-svc.ns1");
        assert_eq!(http_route.rules[0].backend_refs[1].target, "orange-svc.ns1");
        match &http_route.rules[2].matches[0] {
            HttpRouteMatch::PathPrefix { path } => assert_eq!(path, "/"),
            _ => panic!("expected path-prefix catch-all"),
        }
        assert!(http_route.rules[2].matches.len() == 1);
    }

    #[tokio::test]
    async fn missing_backend_fails_without_writing_anything() {
        let store = ObjectStore::new();
        let synth = RouteSynthesizer::new(&store);
        let err = synth.synthesize(&route_with_two_backends()).await.unwrap_err();
        assert!(matches!(err, RouteSynthError::BackendNotFound(_)));
    }

    #[tokio::test]
    async fn rewrite_filter_is_created_idempotently() {
        let store = ObjectStore::new();
        store.ai_backends.apply(backend("apple", "ns1")).await.unwrap();
        store.ai_backends.apply(backend("orange", "ns1")).await.unwrap();
        let synth = RouteSynthesizer::new(&store);

        synth.synthesize(&route_with_two_backends()).await.unwrap();
        synth.synthesize(&route_with_two_backends()).await.unwrap();

        let key = NamespacedName::new("ns1", REWRITE_FILTER_NAME);
        assert!(store.rewrite_filters.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cross_namespace_without_grant_is_rejected() {
        let store = ObjectStore::new();
        store.ai_backends.apply(backend("apple", "ns2")).await.unwrap();
        let mut route = route_with_two_backends();
        route.rules[0].backend_refs = vec![BackendRef {
            name: "apple".to_string(),
            namespace: Some("ns2".to_string()),
            weight: 1,
            priority: 0,
        }];

        let synth = RouteSynthesizer::new(&store);
        let err = synth.synthesize(&route).await.unwrap_err();
        assert!(matches!(err, RouteSynthError::ReferenceNotAdmitted(..)));
    }

    #[tokio::test]
    async fn cross_namespace_with_admitting_grant_succeeds() {
        use crate::domain::ReferenceGrant;

        let store = ObjectStore::new();
        store.ai_backends.apply(backend("apple", "ns2")).await.unwrap();
        store
            .reference_grants
            .apply(ReferenceGrant {
                meta: ObjectMeta { namespace: "ns2".to_string(), name: "grant1".to_string(), ..Default::default() },
                from_group: "aigateway".to_string(),
                from_kind: "AIGatewayRoute".to_string(),
                from_namespace: "ns1".to_string(),
                to_group: "aigateway".to_string(),
                to_kind: "AIServiceBackend".to_string(),
            })
            .await
            .unwrap();

        let mut route = route_with_two_backends();
        route.rules[0].backend_refs = vec![BackendRef {
            name: "apple".to_string(),
            namespace: Some("ns2".to_string()),
            weight: 1,
            priority: 0,
        }];

        let synth = RouteSynthesizer::new(&store);
        assert!(synth.synthesize(&route).await.is_ok());
    }

    #[tokio::test]
    async fn priority_annotation_concatenates_in_order() {
        let store = ObjectStore::new();
        store.ai_backends.apply(backend("apple", "ns1")).await.unwrap();
        store.ai_backends.apply(backend("orange", "ns1")).await.unwrap();

        let synth = RouteSynthesizer::new(&store);
        let http_route = synth.synthesize(&route_with_two_backends()).await.unwrap();
        let annotation = http_route.meta.annotations.get(BACKEND_REF_PRIORITY_ANNOTATION).unwrap();
        assert_eq!(annotation, "0:apple:00:orange:0");
    }
}
