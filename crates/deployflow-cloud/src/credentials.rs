//! Default credential discovery
//!
//! Access tokens are looked up in this order:
//! 1. `GOOGLE_OAUTH_ACCESS_TOKEN` environment variable
//! 2. The GCE metadata server (default service account)
//!
//! Discovery returns an error instead of panicking, so callers can report
//! missing credentials on their own terms.

use crate::error::{DeployError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
const METADATA_HOST: &str = "metadata.google.internal";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of OAuth2 bearer tokens for the Deployment Manager API
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, typically from `gcloud auth print-access-token`
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from `GOOGLE_OAUTH_ACCESS_TOKEN`
    pub fn from_env() -> Result<Self> {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token.trim())),
            _ => Err(DeployError::Authentication(format!(
                "{} is not set",
                ACCESS_TOKEN_ENV
            ))),
        }
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Tokens for the default service account, fetched from the metadata server
pub struct MetadataServerToken {
    client: reqwest::Client,
    endpoint: String,
    cached: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl MetadataServerToken {
    pub fn new(client: reqwest::Client) -> Self {
        let host = std::env::var(METADATA_HOST_ENV).unwrap_or_else(|_| METADATA_HOST.to_string());
        Self::with_endpoint(client, format!("http://{}{}", host, METADATA_TOKEN_PATH))
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<TokenResponse> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Metadata-Flavor", "Google")
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                DeployError::Authentication(format!("metadata server unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(DeployError::Authentication(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenSource for MetadataServerToken {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let response = self.fetch().await?;
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(
            "Fetched access token from metadata server (expires in {}s)",
            response.expires_in
        );

        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }
}

/// Discover default credentials
///
/// The metadata server is probed once so that a missing credential is
/// reported here rather than on the first API call.
pub async fn default_token_source(client: &reqwest::Client) -> Result<Arc<dyn TokenSource>> {
    if let Ok(token) = StaticToken::from_env() {
        tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
        return Ok(Arc::new(token));
    }

    let metadata = MetadataServerToken::new(client.clone());
    match metadata.access_token().await {
        Ok(_) => {
            tracing::debug!("Using metadata server credentials");
            Ok(Arc::new(metadata))
        }
        Err(e) => Err(DeployError::Authentication(format!(
            "no default credentials found: set {} or run on GCE ({})",
            ACCESS_TOKEN_ENV, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    #[serial]
    async fn test_static_token_from_env() {
        unsafe {
            std::env::set_var(ACCESS_TOKEN_ENV, " ya29.token \n");
        }

        let token = StaticToken::from_env().unwrap();
        assert_eq!(token.access_token().await.unwrap(), "ya29.token");

        let source = default_token_source(&reqwest::Client::new()).await.unwrap();
        assert_eq!(source.access_token().await.unwrap(), "ya29.token");

        unsafe {
            std::env::remove_var(ACCESS_TOKEN_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_static_token_missing() {
        unsafe {
            std::env::remove_var(ACCESS_TOKEN_ENV);
        }

        let result = StaticToken::from_env();
        assert!(matches!(result, Err(DeployError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_metadata_token_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(METADATA_TOKEN_PATH))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.metadata",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = MetadataServerToken::with_endpoint(
            reqwest::Client::new(),
            format!("{}{}", server.uri(), METADATA_TOKEN_PATH),
        );

        assert_eq!(source.access_token().await.unwrap(), "ya29.metadata");
        assert_eq!(source.access_token().await.unwrap(), "ya29.metadata");
    }

    #[tokio::test]
    async fn test_metadata_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = MetadataServerToken::with_endpoint(
            reqwest::Client::new(),
            format!("{}{}", server.uri(), METADATA_TOKEN_PATH),
        );

        let result = source.access_token().await;
        assert!(matches!(result, Err(DeployError::Authentication(_))));
    }
}
