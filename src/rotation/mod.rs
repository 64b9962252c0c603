//! Credential rotation: `spec.md` §4.8 "RotationEngine". Exchanges a
//! `BackendSecurityPolicy`'s OIDC identity token for cloud-provider
//! credentials (AWS STS or Azure AD) and writes them into a dedicated
//! rotation secret, then schedules the next rotation ahead of expiry.

mod aws_sts;
mod azure;
mod error;
mod oidc;
mod scheduler;

pub use aws_sts::{AwsStsCredentials, HttpStsClient, StsClient};
pub use azure::{AzureToken, AzureTokenClient, HttpAzureTokenClient};
pub use error::RotationError;
pub use oidc::{HttpOidcClient, OidcClient, OidcProviderMetadata};
pub use scheduler::RotationScheduler;

use crate::credentials::{ini, CredentialStore};
use crate::domain::backend_security_policy::{BackendSecurityPolicy, SecurityPolicyVariant};
use crate::store::{NamespacedName, ObjectStore};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Data key under which an OIDC/Azure client secret is stored in its
/// referenced `Secret` object.
const DATA_KEY_CLIENT_SECRET: &str = "client-secret";

/// How far ahead of expiry a rotation is scheduled. `spec.md` §9 Open
/// Question 3: configurable, defaults to 5 minutes; distinct from the
/// fixed retry backoff below.
pub const DEFAULT_PRE_ROTATION_WINDOW: Duration = Duration::minutes(5);

/// Fixed backoff applied after a retryable rotation failure (`spec.md`
/// §4.4, §4.8).
pub const ROTATION_RETRY_BACKOFF: Duration = Duration::minutes(1);

pub struct RotationEngine {
    store: Arc<ObjectStore>,
    oidc: Arc<dyn OidcClient>,
    sts: Arc<dyn StsClient>,
    azure: Arc<dyn AzureTokenClient>,
    scheduler: RotationScheduler,
    in_flight: DashMap<NamespacedName, Arc<Mutex<()>>>,
    pre_rotation_window: Duration,
}

impl RotationEngine {
    pub fn new(
        store: Arc<ObjectStore>,
        oidc: Arc<dyn OidcClient>,
        sts: Arc<dyn StsClient>,
        azure: Arc<dyn AzureTokenClient>,
    ) -> Self {
        Self {
            store,
            oidc,
            sts,
            azure,
            scheduler: RotationScheduler::new(),
            in_flight: DashMap::new(),
            pre_rotation_window: DEFAULT_PRE_ROTATION_WINDOW,
        }
    }

    pub fn with_pre_rotation_window(mut self, window: Duration) -> Self {
        self.pre_rotation_window = window;
        self
    }

    /// How far ahead of expiry this engine rotates. Exposed so callers can
    /// implement the §4.4 step 2 freshness guard ("missing or within the
    /// pre-rotation window") without duplicating the configured window.
    pub fn pre_rotation_window(&self) -> Duration {
        self.pre_rotation_window
    }

    fn lock_for(&self, policy: &NamespacedName) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(policy.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read_client_secret(&self, secret_ref: &NamespacedName) -> Result<String, RotationError> {
        let secret = self
            .store
            .secrets
            .get(secret_ref)
            .await?
            .ok_or_else(|| RotationError::ClientSecretUnreadable(secret_ref.to_string()))?;
        secret
            .data
            .get(DATA_KEY_CLIENT_SECRET)
            .cloned()
            .ok_or_else(|| RotationError::ClientSecretUnreadable(secret_ref.to_string()))
    }

    /// Performs one rotation for `policy` and returns the instant the next
    /// rotation should run. Non-rotating variants (api-key, static, plain
    /// client-secret) are a no-op returning `None`.
    pub async fn rotate(
        &self,
        policy: &BackendSecurityPolicy,
    ) -> Result<Option<DateTime<Utc>>, RotationError> {
        let key = policy.key();
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let next = match &policy.variant {
            SecurityPolicyVariant::AwsOidc { oidc, role_arn, region } => {
                let secret_ref = oidc.client_secret_ref.resolve(&key.namespace);
                let client_secret = self.read_client_secret(&secret_ref).await?;
                let metadata = self.oidc.discover(&oidc.issuer_url).await?;
                let id_token = self
                    .oidc
                    .exchange_client_credentials(
                        &metadata.token_endpoint,
                        &oidc.client_id,
                        &client_secret,
                        &oidc.scopes,
                    )
                    .await?;
                let sts_creds = self
                    .sts
                    .assume_role_with_web_identity(role_arn, &id_token, region)
                    .await?;

                let file = ini::single_profile_default(
                    &sts_creds.access_key_id,
                    &sts_creds.secret_access_key,
                    Some(&sts_creds.session_token),
                    region,
                );
                let creds = CredentialStore::new(&self.store);
                creds
                    .write_aws_credentials(&key, &file, sts_creds.expiration)
                    .await?;
                sts_creds.expiration
            }
            SecurityPolicyVariant::AzureOidc { oidc, tenant_id, client_id } => {
                let secret_ref = oidc.client_secret_ref.resolve(&key.namespace);
                let client_secret = self.read_client_secret(&secret_ref).await?;
                let metadata = self.oidc.discover(&oidc.issuer_url).await?;
                let id_token = self
                    .oidc
                    .exchange_client_credentials(
                        &metadata.token_endpoint,
                        &oidc.client_id,
                        &client_secret,
                        &oidc.scopes,
                    )
                    .await?;
                let azure_token = self.azure.exchange(tenant_id, client_id, &id_token).await?;

                let creds = CredentialStore::new(&self.store);
                creds
                    .write_azure_token(&key, &azure_token.access_token, azure_token.expiration)
                    .await?;
                azure_token.expiration
            }
            _ => return Ok(None),
        };

        let reschedule_at = next - self.pre_rotation_window;
        self.scheduler.schedule(key, reschedule_at);
        Ok(Some(next))
    }

    /// Arms a timer for `policy` without performing a rotation, e.g. on
    /// controller startup when a still-valid credential secret already
    /// exists (`spec.md` §4.8 "Startup reconciliation").
    pub fn schedule_existing(&self, policy: &NamespacedName, expiration: DateTime<Utc>) {
        self.scheduler
            .schedule(policy.clone(), expiration - self.pre_rotation_window);
    }

    /// Schedules an immediate retry after a retryable failure.
    pub fn schedule_retry(&self, policy: &NamespacedName) {
        self.scheduler
            .schedule(policy.clone(), Utc::now() + ROTATION_RETRY_BACKOFF);
    }

    pub async fn take_due_receiver(&self) -> tokio::sync::mpsc::Receiver<NamespacedName> {
        self.scheduler.take_due_receiver().await
    }

    pub async fn cleanup(&self) {
        self.scheduler.cleanup().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend_security_policy::{OidcConfig, SecretRef};
    use crate::domain::{Secret, Status};
    use crate::store::{ObjectMeta, TypedStore};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubOidc;
    #[async_trait]
    impl OidcClient for StubOidc {
        async fn discover(&self, _issuer_url: &str) -> Result<OidcProviderMetadata, RotationError> {
            Ok(OidcProviderMetadata {
                token_endpoint: "https://issuer.example/token".to_string(),
            })
        }
        async fn exchange_client_credentials(
            &self,
            _token_endpoint: &str,
            _client_id: &str,
            _client_secret: &str,
            _scopes: &[String],
        ) -> Result<String, RotationError> {
            Ok("id-token".to_string())
        }
    }

    struct StubSts {
        calls: AtomicUsize,
    }
    #[async_trait]
    impl StsClient for StubSts {
        async fn assume_role_with_web_identity(
            &self,
            _role_arn: &str,
            _id_token: &str,
            region: &str,
        ) -> Result<AwsStsCredentials, RotationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AwsStsCredentials {
                access_key_id: "AKIA".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: "token".to_string(),
                expiration: Utc::now() + Duration::hours(1),
            })
        }
    }

    struct StubAzure;
    #[async_trait]
    impl AzureTokenClient for StubAzure {
        async fn exchange(
            &self,
            _tenant_id: &str,
            _client_id: &str,
            _id_token: &str,
        ) -> Result<AzureToken, RotationError> {
            Ok(AzureToken {
                access_token: "azure-token".to_string(),
                expiration: Utc::now() + Duration::hours(1),
            })
        }
    }

    fn aws_oidc_policy() -> BackendSecurityPolicy {
        BackendSecurityPolicy {
            meta: ObjectMeta {
                namespace: "ns1".to_string(),
                name: "pol1".to_string(),
                ..Default::default()
            },
            variant: SecurityPolicyVariant::AwsOidc {
                oidc: OidcConfig {
                    issuer_url: "https://issuer.example".to_string(),
                    client_id: "client-1".to_string(),
                    client_secret_ref: SecretRef {
                        name: "oidc-secret".to_string(),
                        namespace: None,
                    },
                    scopes: vec![],
                },
                role_arn: "arn:aws:iam::123:role/example".to_string(),
                region: "us-east-1".to_string(),
            },
            target_ai_backends: vec![],
            status: Status::default(),
        }
    }

    async fn seed_client_secret(store: &ObjectStore) {
        let mut data = HashMap::new();
        data.insert(DATA_KEY_CLIENT_SECRET.to_string(), "shh".to_string());
        store
            .secrets
            .apply(Secret {
                meta: ObjectMeta {
                    namespace: "ns1".to_string(),
                    name: "oidc-secret".to_string(),
                    ..Default::default()
                },
                data,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rotate_aws_oidc_writes_credentials_and_reschedules() {
        let store = Arc::new(ObjectStore::new());
        seed_client_secret(&store).await;

        let engine = RotationEngine::new(
            store.clone(),
            Arc::new(StubOidc),
            Arc::new(StubSts { calls: AtomicUsize::new(0) }),
            Arc::new(StubAzure),
        );

        let policy = aws_oidc_policy();
        let next = engine.rotate(&policy).await.unwrap();
        assert!(next.is_some());

        let creds_store = CredentialStore::new(&store);
        let key = policy.key();
        assert!(creds_store.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn rotate_non_rotating_variant_is_a_no_op() {
        let store = Arc::new(ObjectStore::new());
        let engine = RotationEngine::new(
            store.clone(),
            Arc::new(StubOidc),
            Arc::new(StubSts { calls: AtomicUsize::new(0) }),
            Arc::new(StubAzure),
        );

        let policy = BackendSecurityPolicy {
            meta: ObjectMeta {
                namespace: "ns1".to_string(),
                name: "pol1".to_string(),
                ..Default::default()
            },
            variant: SecurityPolicyVariant::ApiKey {
                secret_ref: SecretRef {
                    name: "key".to_string(),
                    namespace: None,
                },
            },
            target_ai_backends: vec![],
            status: Status::default(),
        };

        assert!(engine.rotate(&policy).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_client_secret_is_not_retryable() {
        let store = Arc::new(ObjectStore::new());
        let engine = RotationEngine::new(
            store,
            Arc::new(StubOidc),
            Arc::new(StubSts { calls: AtomicUsize::new(0) }),
            Arc::new(StubAzure),
        );

        let err = engine.rotate(&aws_oidc_policy()).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(err, RotationError::ClientSecretUnreadable(_)));
    }
}
