//! `run` command: wires up the object store, the event bus, the rotation
//! engine, and the five reconcilers, then blocks until the process is
//! asked to shut down.
//!
//! There is no cluster watch in this crate (`spec.md` §1) — the object
//! store here is the in-memory implementation, fed only by whatever an
//! embedder drives through [`crate::store::ObjectStore`] directly or a
//! future watch-adapter built on top of it. `run` exists to exercise the
//! full reconcile framework end to end: worker loops draining the event
//! bus, the dedicated security-policy channel bridging
//! [`crate::rotation::RotationEngine::take_due_receiver`], and a graceful
//! shutdown that drains in-flight rotations.

use crate::cli::RunArgs;
use crate::config::ControlPlaneConfig;
use crate::events::GenericEventBus;
use crate::index::Indexer;
use crate::reconcile::{
    run_worker_loop, AiBackendReconciler, AiRouteReconciler, GatewayConfigReconciler,
    GatewayReconciler, SecurityPolicyReconciler,
};
use crate::rotation::{HttpAzureTokenClient, HttpOidcClient, HttpStsClient, RotationEngine};
use crate::store::ObjectStore;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

const SECURITY_POLICY_CHANNEL_CAPACITY: usize = 16;

pub async fn handle_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ControlPlaneConfig::load(args.config.as_deref())?.with_env_overrides();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;

    crate::logging::init(&config.logging);
    info!(config = ?config, "starting control plane");

    let store = Arc::new(ObjectStore::new());
    let index = Arc::new(Indexer::new());
    let events = Arc::new(GenericEventBus::new());

    let http = reqwest::Client::new();
    let rotation = Arc::new(
        RotationEngine::new(
            store.clone(),
            Arc::new(HttpOidcClient::new(http.clone())),
            Arc::new(HttpStsClient::new(http.clone())),
            Arc::new(HttpAzureTokenClient::new(http)),
        )
        .with_pre_rotation_window(ChronoDuration::seconds(
            config.rotation.pre_rotation_window_seconds as i64,
        )),
    );

    let (security_policy_tx, security_policy_rx) =
        mpsc::channel(SECURITY_POLICY_CHANNEL_CAPACITY);

    let ai_route_reconciler =
        Arc::new(AiRouteReconciler::new(store.clone(), index.clone(), events.clone()));
    let ai_backend_reconciler =
        Arc::new(AiBackendReconciler::new(store.clone(), index.clone(), events.clone()));
    let security_policy_reconciler = Arc::new(SecurityPolicyReconciler::new(
        store.clone(),
        index.clone(),
        events.clone(),
        rotation.clone(),
    ));
    let gateway_reconciler = Arc::new(GatewayReconciler::new(
        store.clone(),
        index.clone(),
        config.startup.uds_path.clone(),
        config.startup.envoy_gateway_system_namespace.clone(),
    ));
    let gateway_config_reconciler =
        Arc::new(GatewayConfigReconciler::new(store.clone(), events.clone()));

    // `GatewayConfig` has no fan-out producer in `GenericEventBus` — nothing
    // in this crate derives one `GatewayConfig` from another kind's write.
    // Its only driver would be a primary watch on `GatewayConfig` itself,
    // which is out of scope here along with every other cluster watch
    // (`spec.md` §1). The channel is kept open and the worker loop spawned
    // anyway so the reconciler is ready the moment an embedder wires one in.
    let (_gateway_config_tx, gateway_config_rx) = mpsc::channel(1);

    tokio::spawn(run_worker_loop(ai_route_reconciler, events.take_ai_route_receiver().await));
    tokio::spawn(run_worker_loop(ai_backend_reconciler, events.take_ai_backend_receiver().await));
    tokio::spawn(run_worker_loop(gateway_reconciler, events.take_gateway_receiver().await));
    tokio::spawn(run_worker_loop(gateway_config_reconciler, gateway_config_rx));
    tokio::spawn(run_worker_loop(security_policy_reconciler, security_policy_rx));

    // Bridges the rotation engine's own due-timer channel into the
    // security-policy worker loop: a scheduled rotation re-enters
    // reconciliation the same way an external watch event would.
    let bridge_rotation = rotation.clone();
    tokio::spawn(async move {
        let mut due = bridge_rotation.take_due_receiver().await;
        while let Some(key) = due.recv().await {
            let _ = security_policy_tx.send(key).await;
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, draining in-flight rotations");
    rotation.cleanup().await;

    Ok(())
}
