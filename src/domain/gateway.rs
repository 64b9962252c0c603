use crate::store::{KubeObject, NamespacedName, ObjectMeta};
use serde::{Deserialize, Serialize};

/// A Gateway is consumed, not owned: this crate never creates or deletes
/// one, only reads it to learn its identity and attaches derived objects to
/// it. See `spec.md` §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub meta: ObjectMeta,
}

impl KubeObject for Gateway {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl Gateway {
    pub fn key(&self) -> NamespacedName {
        self.meta.key()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtprocResources {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub meta: ObjectMeta,
    /// The Gateway this configuration parameterizes. A change to the
    /// `GatewayConfig` fans out a Gateway event (`spec.md` §4.9).
    pub gateway_ref: NamespacedName,
    pub extproc_image: String,
    #[serde(default)]
    pub extproc_log_level: Option<String>,
    #[serde(default)]
    pub extproc_env: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub extproc_resources: ExtprocResources,
    #[serde(default)]
    pub status: super::status::Status,
}

impl KubeObject for GatewayConfig {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl GatewayConfig {
    pub fn key(&self) -> NamespacedName {
        self.meta.key()
    }
}
