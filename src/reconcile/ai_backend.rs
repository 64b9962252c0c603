//! `AIBackend` reconciler. `spec.md` §4.3: resolve the reverse index and
//! fan out to every `AIRoute` that references this backend; an `AIBackend`
//! has no derived object of its own.

use super::{ReconcileError, Reconciler};
use crate::events::GenericEventBus;
use crate::index::Indexer;
use crate::store::{NamespacedName, ObjectStore, TypedStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub struct AiBackendReconciler {
    store: Arc<ObjectStore>,
    index: Arc<Indexer>,
    events: Arc<GenericEventBus>,
}

impl AiBackendReconciler {
    pub fn new(store: Arc<ObjectStore>, index: Arc<Indexer>, events: Arc<GenericEventBus>) -> Self {
        Self { store, index, events }
    }
}

#[async_trait]
impl Reconciler for AiBackendReconciler {
    async fn reconcile(&self, key: &NamespacedName) -> Result<(), ReconcileError> {
        let Some(backend) = self.store.ai_backends.get(key).await? else {
            self.index.remove_backend(key);
            return Ok(());
        };

        self.index.reindex_backend(&backend);

        self.store
            .ai_backends
            .update_status(key, |b| b.status.accepted("backend ready", Utc::now()))
            .await?;

        for route_key in self.index.routes_referencing_backend(key) {
            self.events.push_ai_route_event(route_key).await;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "ai-backend"
    }
}
