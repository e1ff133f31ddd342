//! DeployFlow Deployment Manager client
//!
//! This crate submits declarative resource sets to Google Cloud Deployment
//! Manager and waits for the resulting operations to finish.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  DeployFlow CLI                  │
//! │          (deployflow insert/update/delete)       │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               deployflow-cloud                   │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │  Normalizer  │  │    DeploymentManager     │ │
//! │  │ (resources → │  │  submit + poll until     │ │
//! │  │    YAML)     │  │  done / deadline / cancel│ │
//! │  └──────────────┘  └────────────┬─────────────┘ │
//! │                    trait DeploymentService       │
//! └─────────────────────────────────┬───────────────┘
//!                                   │
//!                     ┌─────────────▼─────────────┐
//!                     │   GcpDeploymentService    │
//!                     │ (Deployment Manager REST) │
//!                     └───────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use deployflow_cloud::{DeploymentManager, GcpDeploymentService, Resource};
//! use serde_json::json;
//!
//! let service = GcpDeploymentService::from_default_credentials().await?;
//! let manager = DeploymentManager::new(service);
//!
//! let resources = vec![Resource::new(
//!     "my-bucket",
//!     "storage.v1.bucket",
//!     json!({ "location": "US" }),
//! )];
//! manager.insert("my-project", "my-deployment", &resources).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod gcp;
pub mod manager;
pub mod normalize;
pub mod operation;
pub mod resource;
pub mod service;

// Re-exports
pub use credentials::{MetadataServerToken, StaticToken, TokenSource, default_token_source};
pub use error::{DeployError, Result};
pub use gcp::{DEPLOYMENT_MANAGER_API_BASE, GcpDeploymentService};
pub use manager::{DEFAULT_POLL_INTERVAL, DeploymentManager, PollConfig};
pub use normalize::{normalize, normalize_document, normalize_to_bytes};
pub use operation::{Operation, OperationErrorDetail, OperationErrors, OperationStatus};
pub use resource::{Resource, ResourceSet};
pub use service::{ConfigFile, Deployment, DeploymentService, TargetConfiguration};
pub use tokio_util::sync::CancellationToken;
