//! Per-key work dispatch. `spec.md` §5: "writes to different objects may
//! proceed concurrently; writes to the same object are serialized" — the
//! same lock-striping idiom [`crate::rotation::RotationEngine`] uses for
//! in-flight rotations, generalized to drive an event channel instead of a
//! direct call.

use super::{ReconcileError, Reconciler};
use crate::store::NamespacedName;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::Instrument;

/// Fixed retry backoff for a retryable reconcile failure. Shared across all
/// five reconcilers rather than configured per-kind; `spec.md` §4.4 only
/// calls this out for `BackendSecurityPolicy`, but nothing else in scope
/// ever raises a retryable error, so one constant covers it.
const RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Drains `rx`, dispatching each key to `reconciler` on its own task.
/// Two events for the same key never run concurrently — a second event
/// arriving while the first is still being handled (or backing off) simply
/// waits for the per-key lock — but distinct keys proceed in parallel.
pub async fn run_worker_loop<R>(reconciler: Arc<R>, mut rx: mpsc::Receiver<NamespacedName>)
where
    R: Reconciler + 'static,
{
    let locks: Arc<DashMap<NamespacedName, Arc<Mutex<()>>>> = Arc::new(DashMap::new());
    while let Some(key) = rx.recv().await {
        let reconciler = reconciler.clone();
        let locks = locks.clone();
        tokio::spawn(async move {
            let lock = locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            let _guard = lock.lock().await;
            run_with_retry(reconciler.as_ref(), &key).await;
        });
    }
}

async fn run_with_retry(reconciler: &dyn Reconciler, key: &NamespacedName) {
    loop {
        let span = tracing::info_span!(
            "reconcile",
            reconciler = reconciler.name(),
            namespace = %key.namespace,
            name = %key.name,
        );
        let result = reconciler.reconcile(key).instrument(span).await;
        match result {
            Ok(()) => return,
            Err(err) if err.is_retryable() => {
                tracing::warn!(
                    reconciler = reconciler.name(),
                    namespace = %key.namespace,
                    name = %key.name,
                    error = %err,
                    "reconcile failed, retrying after backoff",
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            Err(err) => {
                tracing::error!(
                    reconciler = reconciler.name(),
                    namespace = %key.namespace,
                    name = %key.name,
                    error = %err,
                    "reconcile failed, not retrying",
                );
                return;
            }
        }
    }
}
