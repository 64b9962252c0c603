//! AWS STS `AssumeRoleWithWebIdentity`. The STS API is REST/XML, not JSON;
//! rather than pull in a full AWS SDK (far outside this crate's dependency
//! stack) this extracts the handful of tags the response always carries
//! with a small regex-based scanner, in the same "hand-rolled mini-parser"
//! spirit as the credentials-file parser.

use super::error::RotationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsStsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

#[async_trait]
pub trait StsClient: Send + Sync {
    async fn assume_role_with_web_identity(
        &self,
        role_arn: &str,
        id_token: &str,
        region: &str,
    ) -> Result<AwsStsCredentials, RotationError>;
}

pub struct HttpStsClient {
    client: reqwest::Client,
}

impl HttpStsClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint(region: &str) -> String {
        format!("https://sts.{region}.amazonaws.com/")
    }
}

fn extract_tag(body: &str, tag: &str) -> Option<String> {
    let pattern = format!("<{tag}>(.*?)</{tag}>");
    Regex::new(&pattern)
        .ok()?
        .captures(body)
        .map(|c| c[1].to_string())
}

fn parse_assume_role_response(body: &str) -> Result<AwsStsCredentials, RotationError> {
    let access_key_id = extract_tag(body, "AccessKeyId")
        .ok_or_else(|| RotationError::Sts("missing AccessKeyId in response".to_string()))?;
    let secret_access_key = extract_tag(body, "SecretAccessKey")
        .ok_or_else(|| RotationError::Sts("missing SecretAccessKey in response".to_string()))?;
    let session_token = extract_tag(body, "SessionToken")
        .ok_or_else(|| RotationError::Sts("missing SessionToken in response".to_string()))?;
    let expiration_raw = extract_tag(body, "Expiration")
        .ok_or_else(|| RotationError::Sts("missing Expiration in response".to_string()))?;
    let expiration = DateTime::parse_from_rfc3339(&expiration_raw)
        .map_err(|e| RotationError::Sts(format!("unparseable Expiration '{expiration_raw}': {e}")))?
        .with_timezone(&Utc);

    Ok(AwsStsCredentials {
        access_key_id,
        secret_access_key,
        session_token,
        expiration,
    })
}

#[async_trait]
impl StsClient for HttpStsClient {
    async fn assume_role_with_web_identity(
        &self,
        role_arn: &str,
        id_token: &str,
        region: &str,
    ) -> Result<AwsStsCredentials, RotationError> {
        let form = [
            ("Action", "AssumeRoleWithWebIdentity"),
            ("Version", "2011-06-15"),
            ("RoleArn", role_arn),
            ("WebIdentityToken", id_token),
            ("RoleSessionName", "aigateway-control-plane"),
        ];

        let resp = self
            .client
            .post(Self::endpoint(region))
            .form(&form)
            .send()
            .await
            .map_err(|e| RotationError::Sts(e.to_string()))?
            .error_for_status()
            .map_err(|e| RotationError::Sts(e.to_string()))?;
        let body = resp.text().await.map_err(|e| RotationError::Sts(e.to_string()))?;
        parse_assume_role_response(&body)
    }
}
