use super::status::Status;
use crate::store::{KubeObject, NamespacedName, ObjectMeta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
    pub namespace: Option<String>,
}

impl SecretRef {
    pub fn resolve(&self, fallback_namespace: &str) -> NamespacedName {
        NamespacedName::new(
            self.namespace.clone().unwrap_or_else(|| fallback_namespace.to_string()),
            self.name.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfig {
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret_ref: SecretRef,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityPolicyVariant {
    ApiKey {
        secret_ref: SecretRef,
    },
    AwsStatic {
        secret_ref: SecretRef,
        region: String,
    },
    AwsOidc {
        oidc: OidcConfig,
        role_arn: String,
        region: String,
    },
    AzureClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret_ref: SecretRef,
    },
    AzureOidc {
        oidc: OidcConfig,
        tenant_id: String,
        client_id: String,
    },
}

impl SecurityPolicyVariant {
    pub fn is_rotating(&self) -> bool {
        matches!(
            self,
            SecurityPolicyVariant::AwsOidc { .. } | SecurityPolicyVariant::AzureOidc { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SecurityPolicyVariant::ApiKey { .. } => "api-key",
            SecurityPolicyVariant::AwsStatic { .. } => "aws-static",
            SecurityPolicyVariant::AwsOidc { .. } => "aws-oidc",
            SecurityPolicyVariant::AzureClientSecret { .. } => "azure-client-secret",
            SecurityPolicyVariant::AzureOidc { .. } => "azure-oidc",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSecurityPolicy {
    pub meta: ObjectMeta,
    pub variant: SecurityPolicyVariant,
    /// New-model wiring: this policy explicitly lists the `AIBackend`s it
    /// secures. Unioned with legacy `AIBackend.security_policy_ref` pointers
    /// (Open Question 1).
    #[serde(default)]
    pub target_ai_backends: Vec<String>,
    #[serde(default)]
    pub status: Status,
}

impl KubeObject for BackendSecurityPolicy {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl BackendSecurityPolicy {
    pub fn key(&self) -> NamespacedName {
        self.meta.key()
    }
}
