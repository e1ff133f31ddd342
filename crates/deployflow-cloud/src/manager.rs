//! Deployment client
//!
//! Submits insert/update/delete requests and blocks until the resulting
//! remote operation is done. Waiting polls the operation at a fixed
//! interval; it ends early only on a deadline or a cancellation.

use crate::error::{DeployError, Result};
use crate::normalize::normalize;
use crate::operation::Operation;
use crate::resource::Resource;
use crate::service::{Deployment, DeploymentService};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Default delay between two operation status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How operations are waited on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two status checks
    pub interval: Duration,

    /// Give up after this long. `None` waits until the operation is done.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

/// Deployment client over a [`DeploymentService`]
pub struct DeploymentManager<S> {
    service: S,
    poll: PollConfig,
    cancel: CancellationToken,
    span: tracing::Span,
}

impl<S: DeploymentService> DeploymentManager<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            poll: PollConfig::default(),
            cancel: CancellationToken::new(),
            span: tracing::info_span!("deployment_manager"),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Token that aborts waits started by `insert`, `update` and `delete`
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Parent span for everything this client logs
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Create deployment `name` from `resources` and wait for it
    pub async fn insert<P: Serialize>(
        &self,
        project: &str,
        name: &str,
        resources: &[Resource<P>],
    ) -> Result<Operation> {
        let span = tracing::info_span!(parent: &self.span, "insert", project, deployment = name);
        async {
            let deployment = Deployment::new(name, normalize(resources)?);
            tracing::debug!("Deployment configuration:\n{}", deployment.content());

            let op = self.service.insert_deployment(project, &deployment).await?;
            self.wait(project, &op).await
        }
        .instrument(span)
        .await
    }

    /// Replace the configuration of deployment `name` and wait for it
    pub async fn update<P: Serialize>(
        &self,
        project: &str,
        name: &str,
        resources: &[Resource<P>],
    ) -> Result<Operation> {
        let span = tracing::info_span!(parent: &self.span, "update", project, deployment = name);
        async {
            let deployment = Deployment::new(name, normalize(resources)?);
            tracing::debug!("Deployment configuration:\n{}", deployment.content());

            let op = self.service.update_deployment(project, &deployment).await?;
            self.wait(project, &op).await
        }
        .instrument(span)
        .await
    }

    /// Delete deployment `name` and wait for it
    pub async fn delete(&self, project: &str, name: &str) -> Result<Operation> {
        let span = tracing::info_span!(parent: &self.span, "delete", project, deployment = name);
        async {
            let op = self.service.delete_deployment(project, name).await?;
            self.wait(project, &op).await
        }
        .instrument(span)
        .await
    }

    async fn wait(&self, project: &str, op: &Operation) -> Result<Operation> {
        let deadline = self.poll.timeout.map(|t| Instant::now() + t);
        self.wait_until_done(project, op, deadline, &self.cancel)
            .await
    }

    /// Poll `op` until it is done
    ///
    /// Returns the finished operation, or [`DeployError::OperationFailed`]
    /// with the first reported error message when it finished with errors.
    /// Transport errors end the wait immediately. Without a deadline, and
    /// unless `cancel` fires, this waits for as long as the operation runs.
    pub async fn wait_until_done(
        &self,
        project: &str,
        op: &Operation,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
    ) -> Result<Operation> {
        let started = Instant::now();
        let timed_out = |status: &str| DeployError::Timeout {
            operation: op.name.clone(),
            status: status.to_string(),
            elapsed_secs: started.elapsed().as_secs(),
        };
        let mut last_status = op.status.to_string();

        loop {
            // a stalled status request must not outlive the deadline
            let expired = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            let current = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeployError::Cancelled(op.name.clone())),
                result = self.service.get_operation(project, &op.name) => result?,
                _ = expired => return Err(timed_out(&last_status)),
            };

            tracing::info!(
                "Pending [{}] with status [{}]",
                op.operation_type,
                current.status
            );

            if current.is_done() {
                if let Some(error) = current.first_error() {
                    return Err(DeployError::OperationFailed(error.message.clone()));
                }
                return Ok(current);
            }
            last_status = current.status.to_string();

            let now = Instant::now();
            let mut wake = now + self.poll.interval;
            if let Some(deadline) = deadline {
                if now >= deadline {
                    return Err(timed_out(&last_status));
                }
                wake = wake.min(deadline);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DeployError::Cancelled(op.name.clone())),
                _ = tokio::time::sleep_until(wake) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert!(config.timeout.is_none());
    }
}
