//! Reads and writes opaque credential secrets keyed by
//! `(namespace, derived-name)`. `spec.md` §2 ("CredentialStore").

pub mod ini;

mod error;
pub use error::CredentialsError;
pub use ini::{AwsProfile, CredentialsFile};

use crate::domain::Secret;
use crate::naming;
use crate::store::{NamespacedName, ObjectMeta, ObjectStore, TypedStore};
use chrono::{DateTime, Utc};

/// Annotation carrying the secret's wall-clock expiration, RFC 3339
/// encoded. The source of truth for credential liveness (`spec.md` §5).
pub const ANNOTATION_EXPIRATION: &str = "aigateway/credential-expiration";

const DATA_KEY_CREDENTIALS_INI: &str = "credentials.ini";
const DATA_KEY_ACCESS_TOKEN: &str = "access_token";

/// The derived name of an aws-oidc/azure-oidc policy's rotation secret.
/// Hash-then-truncate per `spec.md` §9; not owner-referenced to the policy
/// (`spec.md` §3 "Lifecycle" — a brief policy edit must not drop the
/// credential).
pub fn rotation_secret_name(policy: &NamespacedName) -> String {
    naming::object_name(&format!("{}-credentials", policy.name), &policy.dotted())
}

pub struct CredentialStore<'a> {
    store: &'a ObjectStore,
}

impl<'a> CredentialStore<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    fn secret_key(&self, policy: &NamespacedName) -> NamespacedName {
        NamespacedName::new(policy.namespace.clone(), rotation_secret_name(policy))
    }

    /// The secret's expiration annotation, if the secret exists and the
    /// annotation parses.
    pub async fn expiration(
        &self,
        policy: &NamespacedName,
    ) -> Result<Option<DateTime<Utc>>, CredentialsError> {
        let key = self.secret_key(policy);
        let Some(secret) = self.store.secrets.get(&key).await? else {
            return Ok(None);
        };
        match secret.meta.annotations.get(ANNOTATION_EXPIRATION) {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| CredentialsError::InvalidExpiration(key.to_string(), e.to_string())),
        }
    }

    pub async fn exists(&self, policy: &NamespacedName) -> Result<bool, CredentialsError> {
        let key = self.secret_key(policy);
        Ok(self.store.secrets.get(&key).await?.is_some())
    }

    /// Writes an AWS credentials file, overwriting any existing secret in
    /// place. Rotation secrets are reconciled-and-overwritten, never
    /// owner-referenced, per `spec.md` §3.
    pub async fn write_aws_credentials(
        &self,
        policy: &NamespacedName,
        file: &CredentialsFile,
        expiration: DateTime<Utc>,
    ) -> Result<(), CredentialsError> {
        let key = self.secret_key(policy);
        let mut data = std::collections::HashMap::new();
        data.insert(DATA_KEY_CREDENTIALS_INI.to_string(), ini::format(file));

        let mut meta = ObjectMeta {
            namespace: key.namespace.clone(),
            name: key.name.clone(),
            ..Default::default()
        };
        meta.annotations
            .insert(ANNOTATION_EXPIRATION.to_string(), expiration.to_rfc3339());

        self.store.secrets.apply(Secret { meta, data }).await?;
        Ok(())
    }

    /// Writes an Azure access token, overwriting any existing secret.
    pub async fn write_azure_token(
        &self,
        policy: &NamespacedName,
        access_token: &str,
        expiration: DateTime<Utc>,
    ) -> Result<(), CredentialsError> {
        let key = self.secret_key(policy);
        let mut data = std::collections::HashMap::new();
        data.insert(DATA_KEY_ACCESS_TOKEN.to_string(), access_token.to_string());

        let mut meta = ObjectMeta {
            namespace: key.namespace.clone(),
            name: key.name.clone(),
            ..Default::default()
        };
        meta.annotations
            .insert(ANNOTATION_EXPIRATION.to_string(), expiration.to_rfc3339());

        self.store.secrets.apply(Secret { meta, data }).await?;
        Ok(())
    }

    pub async fn read_aws_credentials(
        &self,
        policy: &NamespacedName,
    ) -> Result<Option<CredentialsFile>, CredentialsError> {
        let key = self.secret_key(policy);
        let Some(secret) = self.store.secrets.get(&key).await? else {
            return Ok(None);
        };
        match secret.data.get(DATA_KEY_CREDENTIALS_INI) {
            None => Ok(None),
            Some(raw) => Ok(Some(ini::parse(raw)?)),
        }
    }

    pub async fn read_azure_token(
        &self,
        policy: &NamespacedName,
    ) -> Result<Option<String>, CredentialsError> {
        let key = self.secret_key(policy);
        let Some(secret) = self.store.secrets.get(&key).await? else {
            return Ok(None);
        };
        Ok(secret.data.get(DATA_KEY_ACCESS_TOKEN).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn write_then_read_aws_credentials_round_trips() {
        let store = ObjectStore::new();
        let creds = CredentialStore::new(&store);
        let policy = NamespacedName::new("ns1", "pol1");
        let file = ini::single_profile_default("AKIA", "secret", Some("token"), "us-east-1");
        let expiration = Utc::now() + Duration::hours(1);

        creds.write_aws_credentials(&policy, &file, expiration).await.unwrap();

        assert!(creds.exists(&policy).await.unwrap());
        let read_back = creds.read_aws_credentials(&policy).await.unwrap().unwrap();
        assert_eq!(read_back, file);
        let read_expiration = creds.expiration(&policy).await.unwrap().unwrap();
        assert_eq!(read_expiration.timestamp(), expiration.timestamp());
    }

    #[tokio::test]
    async fn missing_secret_reads_as_none() {
        let store = ObjectStore::new();
        let creds = CredentialStore::new(&store);
        let policy = NamespacedName::new("ns1", "pol1");
        assert!(!creds.exists(&policy).await.unwrap());
        assert!(creds.read_aws_credentials(&policy).await.unwrap().is_none());
        assert!(creds.expiration(&policy).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rewrite_overwrites_in_place() {
        let store = ObjectStore::new();
        let creds = CredentialStore::new(&store);
        let policy = NamespacedName::new("ns1", "pol1");
        let first = ini::single_profile_default("AKIA1", "s1", None, "us-east-1");
        let second = ini::single_profile_default("AKIA2", "s2", None, "us-east-1");

        creds.write_aws_credentials(&policy, &first, Utc::now()).await.unwrap();
        creds.write_aws_credentials(&policy, &second, Utc::now()).await.unwrap();

        let read_back = creds.read_aws_credentials(&policy).await.unwrap().unwrap();
        assert_eq!(read_back, second);
    }
}
