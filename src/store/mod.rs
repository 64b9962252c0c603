//! Typed abstraction over the cluster's declarative object store.
//!
//! Every reconciler talks to the cluster exclusively through [`ObjectStore`];
//! nothing in this crate issues a raw API-server request. The in-memory
//! implementation in [`memory`] is both the default runtime backing store
//! (no external cluster dependency is in scope for this crate, see
//! `spec.md` §1) and the deterministic test double every reconciler test
//! reconciles against.

mod collection;
mod error;
pub mod memory;
mod meta;
mod objectstore;

pub use collection::KubeObject;
pub use error::StoreError;
pub use meta::{NamespacedName, ObjectMeta, OwnerRef};
pub use objectstore::ObjectStore;

use async_trait::async_trait;

/// A label selector: all key/value pairs must match exactly.
///
/// This mirrors the subset of Kubernetes label selectors this crate needs
/// (equality matches only — set-based selectors are not used anywhere in
/// `spec.md`).
#[derive(Debug, Clone, Default)]
pub struct LabelSelector(pub Vec<(String, String)>);

impl LabelSelector {
    pub fn matches(&self, cat: impl Fn(&str) -> Option<String>) -> bool {
        self.0.iter().all(|(k, v)| cat(k).as_deref() == Some(v))
    }
}

/// Per-kind typed CRUD surface. Implemented generically by
/// [`memory::MemoryStore`] for every [`KubeObject`] kind this crate manages.
#[async_trait]
pub trait TypedStore<T: KubeObject>: Send + Sync {
    async fn get(&self, key: &NamespacedName) -> Result<Option<T>, StoreError>;

    async fn list(&self, namespace: &str) -> Result<Vec<T>, StoreError>;

    async fn list_by_label(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<T>, StoreError>;

    /// Create-or-update: updates in place (bumping the resource version) if
    /// an object with the same key exists, otherwise creates it. Reconcilers
    /// must use this rather than blind `create`, per `spec.md` §4.1.
    async fn apply(&self, obj: T) -> Result<T, StoreError>;

    /// Update `status` alone, retrying on a resource-version conflict by
    /// re-reading and re-applying `mutate` to the fresh object. Tolerates a
    /// best-effort failure as described in `spec.md` §4.1.
    async fn update_status<F>(&self, key: &NamespacedName, mutate: F) -> Result<(), StoreError>
    where
        F: Fn(&mut T) + Send;

    async fn delete(&self, key: &NamespacedName) -> Result<(), StoreError>;
}
