//! The runtime-configuration document the external processor consumes.
//! `spec.md` §6: stable nested mapping, backends sorted by name, rules in
//! declaration order.

use crate::domain::{ApiSchema, LlmRequestCost};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub version: String,
}

impl From<&ApiSchema> for SchemaField {
    fn from(schema: &ApiSchema) -> Self {
        Self {
            name: schema.family.clone(),
            version: schema.version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AuthLiteral {
    ApiKey { api_key: String },
    Aws { credential_file_literal: String, region: String },
    Azure { access_token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEntry {
    pub name: String,
    pub output_schema: SchemaField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthLiteral>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatchEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBackendRef {
    pub target: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub name: String,
    pub matches: Vec<HeaderMatchEntry>,
    pub backend_refs: Vec<RuleBackendRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfigDocument {
    pub uuid: Uuid,
    pub schema: SchemaField,
    pub model_name_header_key: String,
    pub selected_route_header_key: String,
    pub metadata_namespace: String,
    pub rules: Vec<RuleEntry>,
    pub backends: Vec<BackendEntry>,
    pub llm_request_costs: Vec<LlmRequestCost>,
}

impl FilterConfigDocument {
    /// Canonical byte encoding. Struct field order is serde's serialization
    /// order for a non-map type, so this is stable across calls given
    /// stable input — the content-addressing property `spec.md` §3
    /// invariant 5 relies on.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
