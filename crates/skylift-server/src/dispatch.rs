//! Worker dispatch.
//!
//! Given a repository URL and a project id, request exactly one ephemeral
//! build worker from the launch facility. The worker is fire-and-forget:
//! after launch the only signal back is the project's log stream.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::LaunchConfig;
use crate::error::DispatchError;

/// Per-call launch parameters. Everything else about a launch is fixed
/// process-wide configuration ([`LaunchConfig`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    /// Repository the worker will build.
    pub repository_url: String,
    /// Project the worker publishes logs and artifacts under.
    pub project_id: String,
}

/// Seam to the external container/task-launch facility.
#[async_trait]
pub trait LaunchFacility: Send + Sync {
    /// Request one worker instance with the given parameters injected as its
    /// execution environment.
    async fn launch(&self, params: &LaunchParams) -> Result<(), DispatchError>;
}

/// Launch facility backed by a container runtime CLI (`docker`/`podman`).
pub struct ContainerLauncher {
    config: LaunchConfig,
}

impl ContainerLauncher {
    /// Create a launcher over the given fixed launch configuration.
    #[must_use]
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }
}

/// Arguments for a detached `run` of the builder image.
///
/// Workers get no deterministic `--name`: duplicate dispatches for the same
/// project must be able to run duplicate workers.
fn run_args(config: &LaunchConfig, params: &LaunchParams) -> Vec<String> {
    let mut args: Vec<String> = vec!["run".into(), "-d".into(), "--rm".into()];

    if let Some(network) = &config.network {
        args.push("--network".into());
        args.push(network.clone());
    }

    for (key, value) in &config.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }

    args.push("-e".into());
    args.push(format!("GIT_REPOSITORY_URL={}", params.repository_url));
    args.push("-e".into());
    args.push(format!("PROJECT_ID={}", params.project_id));

    args.push(config.image.clone());
    args
}

#[async_trait]
impl LaunchFacility for ContainerLauncher {
    async fn launch(&self, params: &LaunchParams) -> Result<(), DispatchError> {
        let args = run_args(&self.config, params);
        debug!(runtime = %self.config.runtime, image = %self.config.image, "launching worker container");

        let output = Command::new(&self.config.runtime)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DispatchError::Runtime(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DispatchError::LaunchRejected {
                message: stderr.trim().to_owned(),
            });
        }

        let container_id = String::from_utf8_lossy(&output.stdout);
        debug!(container = %container_id.trim(), "worker container started");
        Ok(())
    }
}

/// Dispatches build workers through a [`LaunchFacility`].
#[derive(Clone)]
pub struct Dispatcher {
    facility: Arc<dyn LaunchFacility>,
}

impl Dispatcher {
    /// Create a dispatcher over the given facility.
    #[must_use]
    pub fn new(facility: Arc<dyn LaunchFacility>) -> Self {
        Self { facility }
    }

    /// Request exactly one worker for `(repository_url, project_id)`.
    ///
    /// No idempotency key, no retry: a second call with the same project id
    /// starts a second worker, and a facility rejection is returned to the
    /// caller as-is.
    pub async fn dispatch(
        &self,
        repository_url: &str,
        project_id: &str,
    ) -> Result<(), DispatchError> {
        let params = LaunchParams {
            repository_url: repository_url.to_owned(),
            project_id: project_id.to_owned(),
        };

        match self.facility.launch(&params).await {
            Ok(()) => {
                info!(project = %project_id, "worker dispatched");
                Ok(())
            }
            Err(e) => {
                error!(project = %project_id, error = %e, "worker dispatch failed");
                Err(e)
            }
        }
    }
}
