//! OIDC discovery and client-credentials token exchange. Used by both the
//! aws-oidc and azure-oidc rotation paths to obtain the identity token the
//! cloud provider's token-exchange endpoint then consumes.

use super::error::RotationError;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OidcProviderMetadata {
    pub token_endpoint: String,
}

#[async_trait]
pub trait OidcClient: Send + Sync {
    async fn discover(&self, issuer_url: &str) -> Result<OidcProviderMetadata, RotationError>;

    async fn exchange_client_credentials(
        &self,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
    ) -> Result<String, RotationError>;
}

/// Real HTTP implementation: `GET <issuer>/.well-known/openid-configuration`
/// then `POST <token_endpoint>` with a `client_credentials` grant.
pub struct HttpOidcClient {
    client: reqwest::Client,
}

impl HttpOidcClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[async_trait]
impl OidcClient for HttpOidcClient {
    async fn discover(&self, issuer_url: &str) -> Result<OidcProviderMetadata, RotationError> {
        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer_url.trim_end_matches('/')
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RotationError::OidcDiscovery(e.to_string()))?
            .error_for_status()
            .map_err(|e| RotationError::OidcDiscovery(e.to_string()))?;
        resp.json::<OidcProviderMetadata>()
            .await
            .map_err(|e| RotationError::OidcDiscovery(e.to_string()))
    }

    async fn exchange_client_credentials(
        &self,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
    ) -> Result<String, RotationError> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
        ];
        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        let resp = self
            .client
            .post(token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| RotationError::TokenExchange(e.to_string()))?
            .error_for_status()
            .map_err(|e| RotationError::TokenExchange(e.to_string()))?;
        let parsed: TokenResponse = resp
            .json()
            .await
            .map_err(|e| RotationError::TokenExchange(e.to_string()))?;
        Ok(parsed.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn discover_and_exchange_against_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_endpoint": format!("{}/token", server.uri())
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "eyFakeJwt"
            })))
            .mount(&server)
            .await;

        let client = HttpOidcClient::new(reqwest::Client::new());
        let metadata = client.discover(&server.uri()).await.unwrap();
        assert_eq!(metadata.token_endpoint, format!("{}/token", server.uri()));

        let token = client
            .exchange_client_credentials(&metadata.token_endpoint, "client-id", "secret", &[])
            .await
            .unwrap();
        assert_eq!(token, "eyFakeJwt");
    }

    #[tokio::test]
    async fn discover_against_unreachable_host_is_retryable() {
        let client = HttpOidcClient::new(reqwest::Client::new());
        let err = client
            .discover("http://127.0.0.1:1")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
