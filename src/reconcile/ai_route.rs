//! `AIRoute` reconciler. `spec.md` §4.2: derive the host gateway's
//! `HTTPRoute` via [`RouteSynthesizer`], set the root's status, fan out to
//! every targeted `Gateway` so its filter config gets rebuilt, and keep
//! [`Indexer`]'s backend/gateway reverse lookups current — this is the one
//! reconciler that owns the `AIRoute` side of both indices (`spec.md` §2).

use super::{ReconcileError, Reconciler};
use crate::events::GenericEventBus;
use crate::index::Indexer;
use crate::routesynth::RouteSynthesizer;
use crate::store::{NamespacedName, ObjectStore, TypedStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub struct AiRouteReconciler {
    store: Arc<ObjectStore>,
    index: Arc<Indexer>,
    events: Arc<GenericEventBus>,
}

impl AiRouteReconciler {
    pub fn new(store: Arc<ObjectStore>, index: Arc<Indexer>, events: Arc<GenericEventBus>) -> Self {
        Self { store, index, events }
    }
}

#[async_trait]
impl Reconciler for AiRouteReconciler {
    async fn reconcile(&self, key: &NamespacedName) -> Result<(), ReconcileError> {
        let Some(route) = self.store.ai_routes.get(key).await? else {
            self.index.remove_route(key);
            self.store.cascade_delete_http_route_owned_by(&key.dotted());
            return Ok(());
        };

        // Reindexed unconditionally, ahead of synthesis: reverse-lookup
        // topology reflects what this route currently references even when
        // synthesis itself fails, so a later backend fix still finds its way
        // back to this route.
        self.index.reindex_route(&route);

        let synth = RouteSynthesizer::new(&self.store);
        match synth.synthesize(&route).await {
            Ok(http_route) => {
                self.store.http_routes.apply(http_route).await?;
                self.store
                    .ai_routes
                    .update_status(key, |r| r.status.accepted("HTTPRoute synthesized", Utc::now()))
                    .await?;
            }
            Err(err) => {
                // A failed synthesis never touches the previously-derived
                // HTTPRoute: a transient missing backend must not take down
                // traffic that was already routing correctly. The error
                // still propagates (§7 MissingReference) so the dispatcher
                // retries with backoff instead of leaving the route stuck.
                self.store
                    .ai_routes
                    .update_status(key, |r| r.status.not_accepted(err.to_string(), Utc::now()))
                    .await?;
                return Err(err.into());
            }
        }

        for gateway_ref in &route.target_gateways {
            self.events.push_gateway_event(gateway_ref.resolve(&key.namespace)).await;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "ai-route"
    }
}
