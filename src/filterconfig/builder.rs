//! `FilterConfigBuilder`: the pure transformation from a Gateway's attached
//! `AIRoute`s to the runtime-configuration document. `spec.md` §4.6.

use super::cel;
use super::document::{
    AuthLiteral, BackendEntry, FilterConfigDocument, HeaderMatchEntry, RuleBackendRef, RuleEntry,
    SchemaField,
};
use super::error::FilterConfigError;
use crate::credentials::CredentialStore;
use crate::domain::{
    rule_header_value, AIBackend, AIRoute, ApiSchema, BackendSecurityPolicy, LlmRequestCost,
    SecurityPolicyVariant, SELECTED_ROUTE_HEADER_KEY,
};
use crate::domain::{MODEL_NAME_HEADER_KEY, METADATA_NAMESPACE};
use crate::store::{NamespacedName, ObjectStore, TypedStore};
use uuid::Uuid;

const DATA_KEY_API_KEY: &str = "api-key";
const DATA_KEY_ACCESS_KEY_ID: &str = "aws_access_key_id";
const DATA_KEY_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
const DATA_KEY_SESSION_TOKEN: &str = "aws_session_token";
const DATA_KEY_CREDENTIALS_INI: &str = "credentials.ini";
const DATA_KEY_ACCESS_TOKEN: &str = "access_token";

pub struct FilterConfigBuilder<'a> {
    store: &'a ObjectStore,
}

impl<'a> FilterConfigBuilder<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    pub async fn build(&self, routes: &[AIRoute]) -> Result<FilterConfigDocument, FilterConfigError> {
        let first = routes.first().ok_or(FilterConfigError::NoAttachedRoutes)?;
        let schema = first.schema.clone();
        for route in routes {
            if route.schema != schema {
                return Err(FilterConfigError::SchemaMismatch(
                    route.key().to_string(),
                    route.schema.clone(),
                    schema,
                ));
            }
        }

        let mut rules = Vec::new();
        let mut backend_keys: Vec<NamespacedName> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for route in routes {
            for (i, rule) in route.rules.iter().enumerate() {
                let name = rule_header_value(&route.meta.name, i);
                let mut backend_refs = Vec::new();
                for backend_ref in &rule.backend_refs {
                    let key = backend_ref.resolve(&route.meta.namespace);
                    let backend = self
                        .store
                        .ai_backends
                        .get(&key)
                        .await?
                        .ok_or_else(|| FilterConfigError::MissingBackend(key.clone()))?;
                    let target = backend.backend_ref.transport_target(&key.namespace);
                    backend_refs.push(RuleBackendRef {
                        target,
                        weight: backend_ref.weight,
                    });
                    if seen.insert(key.clone()) {
                        backend_keys.push(key);
                    }
                }
                rules.push(RuleEntry {
                    name,
                    matches: vec![HeaderMatchEntry {
                        name: SELECTED_ROUTE_HEADER_KEY.to_string(),
                        value: rule_header_value(&route.meta.name, i),
                    }],
                    backend_refs,
                });
            }
        }

        backend_keys.sort_by(|a, b| a.dotted().cmp(&b.dotted()));
        let mut backends = Vec::with_capacity(backend_keys.len());
        for key in &backend_keys {
            let backend = self
                .store
                .ai_backends
                .get(key)
                .await?
                .ok_or_else(|| FilterConfigError::MissingBackend(key.clone()))?;
            let auth = self.resolve_auth(&backend).await?;
            backends.push(BackendEntry {
                name: key.dotted(),
                output_schema: SchemaField::from(&backend.output_schema),
                auth,
            });
        }

        let mut llm_request_costs = Vec::new();
        for route in routes {
            for cost in &route.llm_request_costs {
                if let LlmRequestCost::Cel { metadata_key, expression } = cost {
                    cel::validate(metadata_key, expression)?;
                }
                llm_request_costs.push(cost.clone());
            }
        }

        Ok(FilterConfigDocument {
            uuid: Uuid::new_v4(),
            schema: SchemaField::from(&schema),
            model_name_header_key: MODEL_NAME_HEADER_KEY.to_string(),
            selected_route_header_key: SELECTED_ROUTE_HEADER_KEY.to_string(),
            metadata_namespace: METADATA_NAMESPACE.to_string(),
            rules,
            backends,
            llm_request_costs,
        })
    }

    async fn resolve_auth(&self, backend: &AIBackend) -> Result<Option<AuthLiteral>, FilterConfigError> {
        let Some(policy) = self.find_policy_for(backend).await? else {
            return Ok(None);
        };
        let policy_key = policy.key();

        let literal = match &policy.variant {
            SecurityPolicyVariant::ApiKey { secret_ref } => {
                let key = secret_ref.resolve(&policy_key.namespace);
                let secret = self
                    .store
                    .secrets
                    .get(&key)
                    .await?
                    .ok_or_else(|| FilterConfigError::MissingBackend(key.clone()))?;
                let api_key = secret
                    .data
                    .get(DATA_KEY_API_KEY)
                    .cloned()
                    .ok_or(FilterConfigError::MissingSecretData(key, DATA_KEY_API_KEY))?;
                AuthLiteral::ApiKey { api_key }
            }
            SecurityPolicyVariant::AwsStatic { secret_ref, region } => {
                let key = secret_ref.resolve(&policy_key.namespace);
                let secret = self
                    .store
                    .secrets
                    .get(&key)
                    .await?
                    .ok_or_else(|| FilterConfigError::MissingBackend(key.clone()))?;
                let credential_file_literal = if let Some(raw) = secret.data.get(DATA_KEY_CREDENTIALS_INI) {
                    raw.clone()
                } else {
                    let access_key_id = secret
                        .data
                        .get(DATA_KEY_ACCESS_KEY_ID)
                        .cloned()
                        .ok_or(FilterConfigError::MissingSecretData(key.clone(), DATA_KEY_ACCESS_KEY_ID))?;
                    let secret_access_key = secret
                        .data
                        .get(DATA_KEY_SECRET_ACCESS_KEY)
                        .cloned()
                        .ok_or(FilterConfigError::MissingSecretData(key.clone(), DATA_KEY_SECRET_ACCESS_KEY))?;
                    let session_token = secret.data.get(DATA_KEY_SESSION_TOKEN);
                    let file = crate::credentials::ini::single_profile_default(
                        &access_key_id,
                        &secret_access_key,
                        session_token.map(|s| s.as_str()),
                        region,
                    );
                    crate::credentials::ini::format(&file)
                };
                AuthLiteral::Aws {
                    credential_file_literal,
                    region: region.clone(),
                }
            }
            SecurityPolicyVariant::AwsOidc { region, .. } => {
                let creds_store = CredentialStore::new(self.store);
                let file = creds_store
                    .read_aws_credentials(&policy_key)
                    .await?
                    .ok_or(FilterConfigError::MissingSecretData(
                        policy_key.clone(),
                        DATA_KEY_CREDENTIALS_INI,
                    ))?;
                AuthLiteral::Aws {
                    credential_file_literal: crate::credentials::ini::format(&file),
                    region: region.clone(),
                }
            }
            SecurityPolicyVariant::AzureClientSecret { client_secret_ref, .. } => {
                let key = client_secret_ref.resolve(&policy_key.namespace);
                let secret = self
                    .store
                    .secrets
                    .get(&key)
                    .await?
                    .ok_or_else(|| FilterConfigError::MissingBackend(key.clone()))?;
                let access_token = secret
                    .data
                    .get(DATA_KEY_ACCESS_TOKEN)
                    .cloned()
                    .ok_or(FilterConfigError::MissingSecretData(key, DATA_KEY_ACCESS_TOKEN))?;
                AuthLiteral::Azure { access_token }
            }
            SecurityPolicyVariant::AzureOidc { .. } => {
                let creds_store = CredentialStore::new(self.store);
                let access_token = creds_store
                    .read_azure_token(&policy_key)
                    .await?
                    .ok_or(FilterConfigError::MissingSecretData(
                        policy_key.clone(),
                        DATA_KEY_ACCESS_TOKEN,
                    ))?;
                AuthLiteral::Azure { access_token }
            }
        };

        Ok(Some(literal))
    }

    /// Unions the legacy reverse pointer (`AIBackend.security_policy_ref`)
    /// and the new forward pointer (`BackendSecurityPolicy.target_ai_backends`),
    /// per `spec.md` §9 Open Question 1. Both are resolved within the
    /// backend's own namespace.
    async fn find_policy_for(
        &self,
        backend: &AIBackend,
    ) -> Result<Option<BackendSecurityPolicy>, FilterConfigError> {
        if let Some(name) = &backend.security_policy_ref {
            let key = NamespacedName::new(backend.meta.namespace.clone(), name.clone());
            if let Some(policy) = self.store.security_policies.get(&key).await? {
                return Ok(Some(policy));
            }
        }

        for policy in self.store.security_policies.all() {
            if policy.meta.namespace == backend.meta.namespace
                && policy.target_ai_backends.iter().any(|n| n == &backend.meta.name)
            {
                return Ok(Some(policy));
            }
        }

        Ok(None)
    }
}
