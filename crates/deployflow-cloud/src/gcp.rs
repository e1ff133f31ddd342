//! Deployment Manager REST API client
//!
//! Direct HTTPS implementation of [`DeploymentService`] against the
//! Deployment Manager `v2beta` API, authenticated with a bearer token.

use crate::credentials::{self, TokenSource};
use crate::error::{DeployError, Result};
use crate::operation::Operation;
use crate::service::{Deployment, DeploymentService};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const DEPLOYMENT_MANAGER_API_BASE: &str =
    "https://www.googleapis.com/deploymentmanager/v2beta";

/// Deployment Manager API client
pub struct GcpDeploymentService {
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    base_url: String,
}

impl GcpDeploymentService {
    /// Create a client from an HTTP client and a token source
    pub fn new(client: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client,
            tokens,
            base_url: DEPLOYMENT_MANAGER_API_BASE.to_string(),
        }
    }

    /// Create a client using default credentials
    pub async fn from_default_credentials() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let tokens = credentials::default_token_source(&client).await?;
        Ok(Self::new(client, tokens))
    }

    /// Point the client at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn deployments_url(&self, project: &str) -> String {
        format!("{}/projects/{}/global/deployments", self.base_url, project)
    }

    fn operation_url(&self, project: &str, operation: &str) -> String {
        format!(
            "{}/projects/{}/global/operations/{}",
            self.base_url, project, operation
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Operation> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Api {
                status: status.as_u16(),
                message: api_error_message(&body, status),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeploymentService for GcpDeploymentService {
    async fn insert_deployment(&self, project: &str, deployment: &Deployment) -> Result<Operation> {
        let url = self.deployments_url(project);
        tracing::debug!("POST {}", url);
        self.send(self.client.post(&url).json(deployment)).await
    }

    async fn update_deployment(&self, project: &str, deployment: &Deployment) -> Result<Operation> {
        let url = format!("{}/{}", self.deployments_url(project), deployment.name);
        tracing::debug!("PUT {}", url);
        self.send(self.client.put(&url).json(deployment)).await
    }

    async fn delete_deployment(&self, project: &str, name: &str) -> Result<Operation> {
        let url = format!("{}/{}", self.deployments_url(project), name);
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await
    }

    async fn get_operation(&self, project: &str, operation: &str) -> Result<Operation> {
        let url = self.operation_url(project, operation);
        self.send(self.client.get(&url)).await
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[allow(dead_code)]
    code: u16,
    message: String,
}

/// Message from a Google API error body, falling back to the status text
fn api_error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}
