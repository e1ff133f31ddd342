//! Remote deployment service trait definition

use crate::error::Result;
use crate::operation::Operation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote orchestration service abstraction
///
/// [`crate::GcpDeploymentService`] talks to Deployment Manager over HTTPS;
/// tests substitute in-memory implementations.
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// Create a deployment
    async fn insert_deployment(&self, project: &str, deployment: &Deployment) -> Result<Operation>;

    /// Replace the configuration of an existing deployment
    async fn update_deployment(&self, project: &str, deployment: &Deployment) -> Result<Operation>;

    /// Delete a deployment and the resources it manages
    async fn delete_deployment(&self, project: &str, name: &str) -> Result<Operation>;

    /// Fetch the current state of an operation
    async fn get_operation(&self, project: &str, operation: &str) -> Result<Operation>;
}

/// Deployment request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub target: TargetConfiguration,
}

impl Deployment {
    /// Deployment named `name` whose configuration is `content`
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: TargetConfiguration {
                config: ConfigFile {
                    content: content.into(),
                },
            },
        }
    }

    /// Configuration document carried by this deployment
    pub fn content(&self) -> &str {
        &self.target.config.content
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfiguration {
    pub config: ConfigFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub content: String,
}
