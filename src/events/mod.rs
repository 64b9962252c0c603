//! Fan-out between reconcilers (`spec.md` §4.9, §9).
//!
//! Three channels, one per consuming kind. A reconciler that depends on
//! another kind's output pushes a [`NamespacedName`] onto that kind's
//! channel after its own write to the object store completes — never
//! before, so the happens-before relationship described in `spec.md` §5
//! ("Writes made by a reconciler are observable to any reconciler receiving
//! an event published after those writes") holds.
//!
//! Channels are given capacity 1 rather than 0: Tokio's `mpsc` has no true
//! zero-capacity/rendezvous mode, and capacity 1 is the closest equivalent
//! that still blocks a second push while the first is unconsumed, giving
//! the back-pressure `spec.md` asks for.

use crate::store::NamespacedName;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 1;

pub struct GenericEventBus {
    ai_route_tx: mpsc::Sender<NamespacedName>,
    ai_route_rx: tokio::sync::Mutex<Option<mpsc::Receiver<NamespacedName>>>,
    gateway_tx: mpsc::Sender<NamespacedName>,
    gateway_rx: tokio::sync::Mutex<Option<mpsc::Receiver<NamespacedName>>>,
    ai_backend_tx: mpsc::Sender<NamespacedName>,
    ai_backend_rx: tokio::sync::Mutex<Option<mpsc::Receiver<NamespacedName>>>,
}

impl GenericEventBus {
    pub fn new() -> Self {
        let (ai_route_tx, ai_route_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (gateway_tx, gateway_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (ai_backend_tx, ai_backend_rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            ai_route_tx,
            ai_route_rx: tokio::sync::Mutex::new(Some(ai_route_rx)),
            gateway_tx,
            gateway_rx: tokio::sync::Mutex::new(Some(gateway_rx)),
            ai_backend_tx,
            ai_backend_rx: tokio::sync::Mutex::new(Some(ai_backend_rx)),
        }
    }

    pub async fn push_ai_route_event(&self, key: NamespacedName) {
        // A closed receiver (no consumer registered yet, or shutdown) is not
        // a framework error: the event is simply lost, same as a cluster
        // watch event arriving with no reconciler running yet would be
        // superseded by the next periodic resync.
        let _ = self.ai_route_tx.send(key).await;
    }

    pub async fn push_gateway_event(&self, key: NamespacedName) {
        let _ = self.gateway_tx.send(key).await;
    }

    pub async fn push_ai_backend_event(&self, key: NamespacedName) {
        let _ = self.ai_backend_tx.send(key).await;
    }

    /// Takes ownership of the `AIRoute` event receiver. Panics if called
    /// twice: exactly one worker loop drains each channel.
    pub async fn take_ai_route_receiver(&self) -> mpsc::Receiver<NamespacedName> {
        self.ai_route_rx
            .lock()
            .await
            .take()
            .expect("ai_route receiver already taken")
    }

    pub async fn take_gateway_receiver(&self) -> mpsc::Receiver<NamespacedName> {
        self.gateway_rx
            .lock()
            .await
            .take()
            .expect("gateway receiver already taken")
    }

    pub async fn take_ai_backend_receiver(&self) -> mpsc::Receiver<NamespacedName> {
        self.ai_backend_rx
            .lock()
            .await
            .take()
            .expect("ai_backend receiver already taken")
    }
}

impl Default for GenericEventBus {
    fn default() -> Self {
        Self::new()
    }
}
