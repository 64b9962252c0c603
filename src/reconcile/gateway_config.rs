//! `GatewayConfig` reconciler. `spec.md` domain note on `GatewayConfig`:
//! "parameterizes the external-processor runtime; a change fans out a
//! `Gateway` event" (`spec.md` §4.9). This kind has no derived object of
//! its own — it only ever triggers the `Gateway` reconciler, which is what
//! actually rebuilds and publishes the runtime configuration.

use super::{ReconcileError, Reconciler};
use crate::events::GenericEventBus;
use crate::store::{NamespacedName, ObjectStore, TypedStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub struct GatewayConfigReconciler {
    store: Arc<ObjectStore>,
    events: Arc<GenericEventBus>,
}

impl GatewayConfigReconciler {
    pub fn new(store: Arc<ObjectStore>, events: Arc<GenericEventBus>) -> Self {
        Self { store, events }
    }
}

#[async_trait]
impl Reconciler for GatewayConfigReconciler {
    async fn reconcile(&self, key: &NamespacedName) -> Result<(), ReconcileError> {
        let Some(config) = self.store.gateway_configs.get(key).await? else {
            return Ok(());
        };

        self.store
            .gateway_configs
            .update_status(key, |c| c.status.accepted("gateway config ready", Utc::now()))
            .await?;

        self.events.push_gateway_event(config.gateway_ref.clone()).await;

        Ok(())
    }

    fn name(&self) -> &str {
        "gateway-config"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExtprocResources, GatewayConfig, Status};
    use crate::store::ObjectMeta;

    #[tokio::test]
    async fn reconcile_fans_out_a_gateway_event() {
        let store = Arc::new(ObjectStore::new());
        let events = Arc::new(GenericEventBus::new());
        let key = NamespacedName::new("ns1", "cfg1");
        let gateway_ref = NamespacedName::new("ns1", "gw-a");
        store
            .gateway_configs
            .apply(GatewayConfig {
                meta: ObjectMeta { namespace: "ns1".to_string(), name: "cfg1".to_string(), ..Default::default() },
                gateway_ref: gateway_ref.clone(),
                extproc_image: "aigateway/extproc:latest".to_string(),
                extproc_log_level: None,
                extproc_env: Default::default(),
                extproc_resources: ExtprocResources::default(),
                status: Status::default(),
            })
            .await
            .unwrap();

        let mut rx = events.take_gateway_receiver().await;
        let reconciler = GatewayConfigReconciler::new(store.clone(), events.clone());
        reconciler.reconcile(&key).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), gateway_ref);
        let updated = store.gateway_configs.get(&key).await.unwrap().unwrap();
        assert!(updated.status.is_accepted());
    }
}
