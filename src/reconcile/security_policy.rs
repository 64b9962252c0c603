//! `BackendSecurityPolicy` reconciler. `spec.md` §4.4: drive
//! [`RotationEngine`] for the two OIDC-backed variants, union the legacy
//! reverse pointer with the new-model `target_ai_backends` list, and fan
//! out to every `AIBackend` either direction names.
//!
//! Retry scheduling for a failed rotation is the engine's own timer
//! (`RotationEngine::schedule_retry`), not the generic dispatcher backoff:
//! a retryable rotation failure re-arms through
//! [`RotationEngine::take_due_receiver`] rather than bouncing this
//! reconciler's own channel.

use super::{ReconcileError, Reconciler};
use crate::credentials::CredentialStore;
use crate::events::GenericEventBus;
use crate::index::Indexer;
use crate::rotation::RotationEngine;
use crate::store::{NamespacedName, ObjectStore, TypedStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub struct SecurityPolicyReconciler {
    store: Arc<ObjectStore>,
    index: Arc<Indexer>,
    events: Arc<GenericEventBus>,
    rotation: Arc<RotationEngine>,
}

impl SecurityPolicyReconciler {
    pub fn new(
        store: Arc<ObjectStore>,
        index: Arc<Indexer>,
        events: Arc<GenericEventBus>,
        rotation: Arc<RotationEngine>,
    ) -> Self {
        Self { store, index, events, rotation }
    }
}

#[async_trait]
impl Reconciler for SecurityPolicyReconciler {
    async fn reconcile(&self, key: &NamespacedName) -> Result<(), ReconcileError> {
        let Some(policy) = self.store.security_policies.get(key).await? else {
            return Ok(());
        };

        if policy.variant.is_rotating() {
            // §4.4 step 2: only invoke rotation when the credential secret
            // is missing or its expiration falls inside the pre-rotation
            // window; otherwise a still-fresh credential is left alone and
            // its existing timer rearmed, so reconciling twice in a row
            // does not rewrite live keys (testable property 3).
            let creds = CredentialStore::new(&self.store);
            let secret_exists = creds.exists(key).await?;
            let expiration = creds.expiration(key).await?;
            let due = !secret_exists
                || match expiration {
                    None => true,
                    Some(exp) => exp - self.rotation.pre_rotation_window() <= Utc::now(),
                };

            if due {
                if let Err(err) = self.rotation.rotate(&policy).await {
                    self.store
                        .security_policies
                        .update_status(key, |p| p.status.not_accepted(err.to_string(), Utc::now()))
                        .await?;
                    if err.is_retryable() {
                        self.rotation.schedule_retry(key);
                    }
                    return Ok(());
                }
            } else if let Some(exp) = expiration {
                self.rotation.schedule_existing(key, exp);
            }
        }

        self.store
            .security_policies
            .update_status(key, |p| p.status.accepted("policy ready", Utc::now()))
            .await?;

        // Union of the legacy reverse pointer (AIBackend.security_policy_ref)
        // and the new-model target_ai_backends list, per Open Question 1.
        let mut targets: Vec<NamespacedName> = policy
            .target_ai_backends
            .iter()
            .map(|name| NamespacedName::new(key.namespace.clone(), name.clone()))
            .collect();
        for legacy in self.index.backends_pointing_at_policy_legacy(key) {
            if !targets.contains(&legacy) {
                targets.push(legacy);
            }
        }
        for backend_key in targets {
            self.events.push_ai_backend_event(backend_key).await;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "backend-security-policy"
    }
}
