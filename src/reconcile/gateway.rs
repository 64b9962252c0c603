//! `Gateway` reconciler. `spec.md` §4.5: a no-op unless at least one
//! `AIRoute` targets it, otherwise ensure the extension wiring, rebuild and
//! publish the runtime-configuration document, and force the external
//! processor's pods to pick it up.

use super::{ReconcileError, Reconciler};
use crate::extpolicy::ExtensionPolicyEnsurer;
use crate::filterconfig::FilterConfigBuilder;
use crate::index::Indexer;
use crate::publisher::FilterConfigPublisher;
use crate::store::{NamespacedName, ObjectStore, TypedStore};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Forces the external processor's pods/deployments in the gateway-system
/// namespace to pick up a freshly published filter config. A fresh value
/// every time, never reused: a stable value would be a no-op change that
/// some rollout mechanisms ignore.
const ROLLOUT_ANNOTATION: &str = "aigateway/filterconfig-rollout";

pub struct GatewayReconciler {
    store: Arc<ObjectStore>,
    index: Arc<Indexer>,
    uds_path: String,
    gateway_system_namespace: String,
}

impl GatewayReconciler {
    pub fn new(
        store: Arc<ObjectStore>,
        index: Arc<Indexer>,
        uds_path: String,
        gateway_system_namespace: String,
    ) -> Self {
        Self { store, index, uds_path, gateway_system_namespace }
    }

    async fn force_processor_rollout(&self) -> Result<(), ReconcileError> {
        let rollout_id = Uuid::new_v4().to_string();
        for mut deployment in self.store.deployments.list(&self.gateway_system_namespace).await? {
            deployment
                .pod_template_annotations
                .insert(ROLLOUT_ANNOTATION.to_string(), rollout_id.clone());
            self.store.deployments.apply(deployment).await?;
        }
        for mut pod in self.store.pods.list(&self.gateway_system_namespace).await? {
            pod.meta.annotations.insert(ROLLOUT_ANNOTATION.to_string(), rollout_id.clone());
            self.store.pods.apply(pod).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Reconciler for GatewayReconciler {
    async fn reconcile(&self, key: &NamespacedName) -> Result<(), ReconcileError> {
        if self.store.gateways.get(key).await?.is_none() {
            return Ok(());
        }

        let route_keys = self.index.routes_targeting_gateway(key);
        if route_keys.is_empty() {
            return Ok(());
        }

        let ensurer = ExtensionPolicyEnsurer::new(&self.store);
        ensurer.ensure(key, &self.uds_path).await?;

        let mut routes = Vec::with_capacity(route_keys.len());
        for route_key in &route_keys {
            if let Some(route) = self.store.ai_routes.get(route_key).await? {
                routes.push(route);
            }
        }

        let builder = FilterConfigBuilder::new(&self.store);
        let document = builder.build(&routes).await?;
        let bytes = document.to_bytes()?;
        let checksum = crate::filterconfig::digest(&bytes);

        let publisher = FilterConfigPublisher::new(&self.store);
        publisher
            .publish(key, &self.gateway_system_namespace, Uuid::new_v4(), &checksum, &bytes)
            .await?;

        self.force_processor_rollout().await?;

        Ok(())
    }

    fn name(&self) -> &str {
        "gateway"
    }
}
