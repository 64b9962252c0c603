//! External-processor sidecar parameters the control plane needs at
//! startup: the image it expects the host gateway to run, the Unix-domain
//! socket it wires up for it (`spec.md` §4.5), and the namespace its pods
//! and deployments live in (`spec.md` §4.7, §4.5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    pub extproc_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extproc_log_level: Option<String>,
    pub envoy_gateway_system_namespace: String,
    pub uds_path: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            extproc_image: String::new(),
            extproc_log_level: None,
            envoy_gateway_system_namespace: "envoy-gateway-system".to_string(),
            uds_path: "/var/run/aigateway/extproc.sock".to_string(),
        }
    }
}
